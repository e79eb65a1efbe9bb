//! In-memory repositories shared by the service tests of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use serde_json::{json, Value};

use crate::errors::{Error, Result};
use crate::household::{
    Household, HouseholdMember, HouseholdMemberUpdate, HouseholdRepositoryTrait,
    HouseholdWithMembers, NewHouseholdMember,
};
use crate::profiles::{
    BatchClaim, ProfileContactUpdate, ProfileRepositoryTrait, ProfileSection, TaxProfile,
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Mutex<HashMap<String, TaxProfile>>,
    reads: AtomicUsize,
    claims: AtomicUsize,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_profile(&self, user_id: &str, email: &str) {
        let profile = TaxProfile {
            user_id: user_id.to_string(),
            full_name: Some("Ada Lovelace".to_string()),
            email: email.to_string(),
            phone: None,
            tax_data: json!({}),
            last_notified_batch_id: None,
            created_at: now(),
            updated_at: now(),
        };
        self.profiles
            .lock()
            .unwrap()
            .insert(user_id.to_string(), profile);
    }

    pub fn set_marker(&self, user_id: &str, marker: Option<&str>) {
        if let Some(profile) = self.profiles.lock().unwrap().get_mut(user_id) {
            profile.last_notified_batch_id = marker.map(str::to_string);
        }
    }

    pub fn marker(&self, user_id: &str) -> Option<String> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .and_then(|p| p.last_notified_batch_id.clone())
    }

    /// Number of profile reads plus claims, i.e. every storage access.
    pub fn accesses(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.claims.load(Ordering::SeqCst)
    }

    fn with_profile<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&mut TaxProfile) -> T,
    ) -> Result<T> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(user_id)
            .ok_or_else(|| Error::NotFound(format!("Profile for user {}", user_id)))?;
        Ok(f(profile))
    }
}

#[async_trait]
impl ProfileRepositoryTrait for InMemoryProfileRepository {
    fn get_profile(&self, user_id: &str) -> Result<TaxProfile> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.with_profile(user_id, |p| p.clone())
    }

    async fn update_contact(
        &self,
        user_id: &str,
        update: ProfileContactUpdate,
    ) -> Result<TaxProfile> {
        self.with_profile(user_id, |p| {
            p.full_name = update.full_name;
            p.phone = update.phone;
            p.updated_at = now();
            p.clone()
        })
    }

    async fn save_section(
        &self,
        user_id: &str,
        section: ProfileSection,
        document: Value,
    ) -> Result<TaxProfile> {
        self.with_profile(user_id, |p| {
            if !p.tax_data.is_object() {
                p.tax_data = json!({});
            }
            if let Some(map) = p.tax_data.as_object_mut() {
                map.insert(section.as_str().to_string(), document);
            }
            p.updated_at = now();
            p.clone()
        })
    }

    async fn claim_notification_batch(&self, user_id: &str, batch_id: &str) -> Result<BatchClaim> {
        self.claims.fetch_add(1, Ordering::SeqCst);
        self.with_profile(user_id, |p| {
            if p.last_notified_batch_id.as_deref() == Some(batch_id) {
                BatchClaim::AlreadyProcessed
            } else {
                let previous = p.last_notified_batch_id.replace(batch_id.to_string());
                BatchClaim::Claimed { previous }
            }
        })
    }

    async fn release_notification_batch(
        &self,
        user_id: &str,
        batch_id: &str,
        previous: Option<String>,
    ) -> Result<bool> {
        self.with_profile(user_id, |p| {
            if p.last_notified_batch_id.as_deref() == Some(batch_id) {
                p.last_notified_batch_id = previous;
                true
            } else {
                false
            }
        })
    }
}

#[derive(Default)]
pub struct InMemoryHouseholdRepository {
    households: Mutex<HashMap<String, HouseholdWithMembers>>,
    next_id: AtomicUsize,
}

impl InMemoryHouseholdRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn household_entry<'a>(
        &self,
        households: &'a mut HashMap<String, HouseholdWithMembers>,
        user_id: &str,
    ) -> &'a mut HouseholdWithMembers {
        let id = self.next_id("hh");
        households
            .entry(user_id.to_string())
            .or_insert_with(|| HouseholdWithMembers {
                household: Household {
                    id,
                    primary_user_id: user_id.to_string(),
                    created_at: now(),
                },
                members: Vec::new(),
            })
    }
}

#[async_trait]
impl HouseholdRepositoryTrait for InMemoryHouseholdRepository {
    async fn get_or_create(&self, user_id: &str) -> Result<HouseholdWithMembers> {
        let mut households = self.households.lock().unwrap();
        Ok(self.household_entry(&mut households, user_id).clone())
    }

    async fn insert_member(
        &self,
        user_id: &str,
        new_member: NewHouseholdMember,
    ) -> Result<HouseholdMember> {
        let member_id = self.next_id("member");
        let mut households = self.households.lock().unwrap();
        let entry = self.household_entry(&mut households, user_id);
        let member = HouseholdMember {
            id: member_id,
            household_id: entry.household.id.clone(),
            first_name: new_member.first_name,
            last_name: new_member.last_name,
            relationship: new_member.relationship,
            date_of_birth: new_member.date_of_birth,
            is_dependent: new_member.is_dependent,
            notes: new_member.notes,
            created_at: now(),
            updated_at: now(),
        };
        entry.members.push(member.clone());
        Ok(member)
    }

    async fn update_member(
        &self,
        user_id: &str,
        member_id: &str,
        update: HouseholdMemberUpdate,
    ) -> Result<HouseholdMember> {
        let mut households = self.households.lock().unwrap();
        let entry = self.household_entry(&mut households, user_id);
        let member = entry
            .members
            .iter_mut()
            .find(|m| m.id == member_id)
            .ok_or_else(|| Error::NotFound(format!("Household member {}", member_id)))?;
        member.first_name = update.first_name;
        member.last_name = update.last_name;
        member.relationship = update.relationship;
        member.date_of_birth = update.date_of_birth;
        member.is_dependent = update.is_dependent;
        member.notes = update.notes;
        member.updated_at = now();
        Ok(member.clone())
    }

    async fn delete_member(&self, user_id: &str, member_id: &str) -> Result<usize> {
        let mut households = self.households.lock().unwrap();
        let entry = self.household_entry(&mut households, user_id);
        let before = entry.members.len();
        entry.members.retain(|m| m.id != member_id);
        Ok(before - entry.members.len())
    }
}
