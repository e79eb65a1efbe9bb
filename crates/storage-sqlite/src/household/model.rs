//! Database models for households.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use taxdesk_core::household::{Household, HouseholdMember, Relationship};
use taxdesk_core::Result;
use uuid::Uuid;

/// Database model for households
#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::households)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HouseholdDB {
    pub id: String,
    pub primary_user_id: String,
    pub created_at: NaiveDateTime,
}

impl HouseholdDB {
    pub fn for_user(user_id: &str, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            primary_user_id: user_id.to_string(),
            created_at: now,
        }
    }
}

impl From<HouseholdDB> for Household {
    fn from(db: HouseholdDB) -> Self {
        Self {
            id: db.id,
            primary_user_id: db.primary_user_id,
            created_at: db.created_at,
        }
    }
}

/// Database model for household members
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Debug,
    Clone,
)]
#[diesel(belongs_to(HouseholdDB, foreign_key = household_id))]
#[diesel(table_name = crate::schema::household_members)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HouseholdMemberDB {
    pub id: String,
    pub household_id: String,
    pub first_name: String,
    pub last_name: String,
    pub relationship: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_dependent: bool,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl HouseholdMemberDB {
    pub fn into_domain(self) -> Result<HouseholdMember> {
        let relationship: Relationship = self.relationship.parse()?;
        Ok(HouseholdMember {
            id: self.id,
            household_id: self.household_id,
            first_name: self.first_name,
            last_name: self.last_name,
            relationship,
            date_of_birth: self.date_of_birth,
            is_dependent: self.is_dependent,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
