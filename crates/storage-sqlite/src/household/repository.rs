use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use taxdesk_core::errors::Error;
use taxdesk_core::household::{
    Household, HouseholdMember, HouseholdMemberUpdate, HouseholdRepositoryTrait,
    HouseholdWithMembers, NewHouseholdMember,
};
use taxdesk_core::Result;
use uuid::Uuid;

use super::model::{HouseholdDB, HouseholdMemberDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{household_members, households};

pub struct HouseholdRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl HouseholdRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        HouseholdRepository { pool, writer }
    }
}

fn find_household(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<HouseholdDB>> {
    Ok(households::table
        .filter(households::primary_user_id.eq(user_id))
        .select(HouseholdDB::as_select())
        .first::<HouseholdDB>(conn)
        .optional()
        .map_err(StorageError::from)?)
}

/// Returns the user's household, inserting it first if the user has none.
/// Must run on the writer connection.
fn ensure_household(conn: &mut SqliteConnection, user_id: &str) -> Result<HouseholdDB> {
    if let Some(household) = find_household(conn, user_id)? {
        return Ok(household);
    }
    let household = HouseholdDB::for_user(user_id, Utc::now().naive_utc());
    diesel::insert_into(households::table)
        .values(&household)
        .execute(conn)
        .map_err(StorageError::from)?;
    Ok(household)
}

fn load_members(
    conn: &mut SqliteConnection,
    household: &HouseholdDB,
) -> Result<Vec<HouseholdMember>> {
    HouseholdMemberDB::belonging_to(household)
        .select(HouseholdMemberDB::as_select())
        .order((
            household_members::created_at.asc(),
            household_members::id.asc(),
        ))
        .load::<HouseholdMemberDB>(conn)
        .map_err(StorageError::from)?
        .into_iter()
        .map(HouseholdMemberDB::into_domain)
        .collect()
}

fn load_member(
    conn: &mut SqliteConnection,
    household_id: &str,
    member_id: &str,
) -> Result<HouseholdMember> {
    household_members::table
        .filter(household_members::id.eq(member_id))
        .filter(household_members::household_id.eq(household_id))
        .select(HouseholdMemberDB::as_select())
        .first::<HouseholdMemberDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Household member {}", member_id)))?
        .into_domain()
}

fn with_members(
    conn: &mut SqliteConnection,
    household: HouseholdDB,
) -> Result<HouseholdWithMembers> {
    let members = load_members(conn, &household)?;
    Ok(HouseholdWithMembers {
        household: Household::from(household),
        members,
    })
}

#[async_trait]
impl HouseholdRepositoryTrait for HouseholdRepository {
    async fn get_or_create(&self, user_id: &str) -> Result<HouseholdWithMembers> {
        {
            let mut conn = get_connection(&self.pool)?;
            if let Some(household) = find_household(&mut conn, user_id)? {
                return with_members(&mut conn, household);
            }
        }

        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<HouseholdWithMembers> {
                let household = ensure_household(conn, &user_id)?;
                with_members(conn, household)
            })
            .await
    }

    async fn insert_member(
        &self,
        user_id: &str,
        new_member: NewHouseholdMember,
    ) -> Result<HouseholdMember> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<HouseholdMember> {
                let household = ensure_household(conn, &user_id)?;
                let now = Utc::now().naive_utc();
                let member_db = HouseholdMemberDB {
                    id: Uuid::new_v4().to_string(),
                    household_id: household.id,
                    first_name: new_member.first_name.trim().to_string(),
                    last_name: new_member.last_name.trim().to_string(),
                    relationship: new_member.relationship.as_str().to_string(),
                    date_of_birth: new_member.date_of_birth,
                    is_dependent: new_member.is_dependent,
                    notes: new_member.notes,
                    created_at: now,
                    updated_at: now,
                };

                diesel::insert_into(household_members::table)
                    .values(&member_db)
                    .returning(HouseholdMemberDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?
                    .into_domain()
            })
            .await
    }

    async fn update_member(
        &self,
        user_id: &str,
        member_id: &str,
        update: HouseholdMemberUpdate,
    ) -> Result<HouseholdMember> {
        let user_id = user_id.to_string();
        let member_id = member_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<HouseholdMember> {
                let not_found = || Error::NotFound(format!("Household member {}", member_id));
                let household = find_household(conn, &user_id)?.ok_or_else(not_found)?;

                let updated = diesel::update(
                    household_members::table
                        .filter(household_members::id.eq(member_id.as_str()))
                        .filter(household_members::household_id.eq(household.id.as_str())),
                )
                .set((
                    household_members::first_name.eq(update.first_name.trim()),
                    household_members::last_name.eq(update.last_name.trim()),
                    household_members::relationship.eq(update.relationship.as_str()),
                    household_members::date_of_birth.eq(update.date_of_birth),
                    household_members::is_dependent.eq(update.is_dependent),
                    household_members::notes.eq(update.notes.as_deref()),
                    household_members::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 0 {
                    return Err(not_found());
                }
                load_member(conn, &household.id, &member_id)
            })
            .await
    }

    async fn delete_member(&self, user_id: &str, member_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        let member_id = member_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let owned_households = households::table
                    .filter(households::primary_user_id.eq(user_id.as_str()))
                    .select(households::id);
                Ok(diesel::delete(
                    household_members::table
                        .filter(household_members::id.eq(member_id.as_str()))
                        .filter(household_members::household_id.eq_any(owned_households)),
                )
                .execute(conn)
                .map_err(StorageError::from)?)
            })
            .await
    }
}
