//! Wire types owned by the HTTP layer.

use serde::{Deserialize, Serialize};
use taxdesk_core::users::RegisterUser;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl From<Credentials> for RegisterUser {
    fn from(c: Credentials) -> Self {
        RegisterUser {
            email: c.email,
            password: c.password,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchNotificationBody {
    pub batch_id: String,
    pub updated_sections: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactBody {
    pub name: String,
    pub email: String,
    pub message: String,
}
