//! Database models for tax profiles.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use taxdesk_core::profiles::TaxProfile;
use taxdesk_core::Result;

use crate::errors::IntoCore;

/// Database model for profiles. `tax_data` holds the JSON document as text.
#[derive(Queryable, Identifiable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProfileDB {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub tax_data: String,
    pub last_notified_batch_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl ProfileDB {
    pub fn into_domain(self) -> Result<TaxProfile> {
        let tax_data = serde_json::from_str(&self.tax_data).into_core()?;
        Ok(TaxProfile {
            user_id: self.user_id,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            tax_data,
            last_notified_batch_id: self.last_notified_batch_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database model for creating the profile of a newly registered user
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::profiles)]
pub struct NewProfileDB {
    pub user_id: String,
    pub email: String,
    pub tax_data: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewProfileDB {
    pub fn empty(user_id: &str, email: &str, now: NaiveDateTime) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            tax_data: "{}".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
