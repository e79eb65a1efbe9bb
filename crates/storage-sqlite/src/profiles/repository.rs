use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;
use serde_json::{Map, Value};
use taxdesk_core::errors::Error;
use taxdesk_core::profiles::{
    BatchClaim, ProfileContactUpdate, ProfileRepositoryTrait, ProfileSection, TaxProfile,
};
use taxdesk_core::Result;

use super::model::ProfileDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::profiles;

pub struct ProfileRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl ProfileRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        ProfileRepository { pool, writer }
    }
}

fn load_profile(conn: &mut SqliteConnection, user_id: &str) -> Result<ProfileDB> {
    profiles::table
        .find(user_id)
        .select(ProfileDB::as_select())
        .first::<ProfileDB>(conn)
        .optional()
        .map_err(StorageError::from)?
        .ok_or_else(|| Error::NotFound(format!("Profile for user {}", user_id)))
}

#[async_trait]
impl ProfileRepositoryTrait for ProfileRepository {
    fn get_profile(&self, user_id: &str) -> Result<TaxProfile> {
        let mut conn = get_connection(&self.pool)?;
        load_profile(&mut conn, user_id)?.into_domain()
    }

    async fn update_contact(
        &self,
        user_id: &str,
        update: ProfileContactUpdate,
    ) -> Result<TaxProfile> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TaxProfile> {
                let updated = diesel::update(profiles::table.find(user_id.as_str()))
                    .set((
                        profiles::full_name.eq(update.full_name),
                        profiles::phone.eq(update.phone),
                        profiles::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(Error::NotFound(format!("Profile for user {}", user_id)));
                }
                load_profile(conn, &user_id)?.into_domain()
            })
            .await
    }

    async fn save_section(
        &self,
        user_id: &str,
        section: ProfileSection,
        document: Value,
    ) -> Result<TaxProfile> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TaxProfile> {
                let current = load_profile(conn, &user_id)?;
                let mut tax_data: Map<String, Value> =
                    match serde_json::from_str::<Value>(&current.tax_data).into_core()? {
                        Value::Object(map) => map,
                        _ => Map::new(),
                    };
                tax_data.insert(section.as_str().to_string(), document);
                let serialized = serde_json::to_string(&tax_data).into_core()?;

                diesel::update(profiles::table.find(user_id.as_str()))
                    .set((
                        profiles::tax_data.eq(serialized),
                        profiles::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                debug!("Saved section {} for user {}", section, user_id);
                load_profile(conn, &user_id)?.into_domain()
            })
            .await
    }

    async fn claim_notification_batch(&self, user_id: &str, batch_id: &str) -> Result<BatchClaim> {
        let user_id = user_id.to_string();
        let batch_id = batch_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<BatchClaim> {
                let previous: Option<String> = profiles::table
                    .find(user_id.as_str())
                    .select(profiles::last_notified_batch_id)
                    .first::<Option<String>>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .ok_or_else(|| Error::NotFound(format!("Profile for user {}", user_id)))?;

                if previous.as_deref() == Some(batch_id.as_str()) {
                    return Ok(BatchClaim::AlreadyProcessed);
                }

                diesel::update(profiles::table.find(user_id.as_str()))
                    .set(profiles::last_notified_batch_id.eq(Some(batch_id.as_str())))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(BatchClaim::Claimed { previous })
            })
            .await
    }

    async fn release_notification_batch(
        &self,
        user_id: &str,
        batch_id: &str,
        previous: Option<String>,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let batch_id = batch_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let restored = diesel::update(
                    profiles::table
                        .filter(profiles::user_id.eq(user_id.as_str()))
                        .filter(profiles::last_notified_batch_id.eq(batch_id.as_str())),
                )
                .set(profiles::last_notified_batch_id.eq(previous))
                .execute(conn)
                .map_err(StorageError::from)?;
                Ok(restored == 1)
            })
            .await
    }
}
