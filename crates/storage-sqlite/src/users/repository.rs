use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;
use log::debug;
use taxdesk_core::errors::Error;
use taxdesk_core::users::{NewUser, User, UserRepositoryTrait};
use taxdesk_core::Result;
use uuid::Uuid;

use super::model::{NewUserDB, UserDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::household::HouseholdDB;
use crate::profiles::NewProfileDB;
use crate::schema::{households, profiles, users};

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        UserRepository { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(User::from)
            .ok_or_else(|| Error::NotFound(format!("User {}", user_id)))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let user = users::table
            .filter(users::email.eq(email))
            .select(UserDB::as_select())
            .first::<UserDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(user.map(User::from))
    }

    async fn create_with_profile(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let now = Utc::now().naive_utc();
                let user_db = NewUserDB {
                    id: Uuid::new_v4().to_string(),
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    created_at: now,
                };

                let created = diesel::insert_into(users::table)
                    .values(&user_db)
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(|e| match e {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            Error::ConstraintViolation(format!(
                                "A user with email {} already exists",
                                user_db.email
                            ))
                        }
                        other => StorageError::from(other).into(),
                    })?;

                diesel::insert_into(profiles::table)
                    .values(NewProfileDB::empty(&created.id, &created.email, now))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                diesel::insert_into(households::table)
                    .values(HouseholdDB::for_user(&created.id, now))
                    .execute(conn)
                    .map_err(StorageError::from)?;

                debug!("Registered user {}", created.id);
                Ok(User::from(created))
            })
            .await
    }
}
