use crate::auth_utils::{hash_password, verify_password};
use crate::entities::{prelude::*, user};
use crate::errors::AppError;
use sea_orm::*;

/// User lookup, creation and authentication, shared by the auth controller
/// and the test fixtures.
pub struct UserService;

impl UserService {
    pub async fn find_by_username(
        db: &DatabaseConnection,
        username: &str,
    ) -> Result<Option<user::Model>, AppError> {
        User::find()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await
            .map_err(AppError::Database)
    }

    pub async fn create(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<user::Model, AppError> {
        let password_hash = hash_password(password)?;

        let new_user = user::ActiveModel {
            username: Set(username.to_owned()),
            password_hash: Set(password_hash),
            is_active: Set(true),
            ..Default::default()
        };

        new_user.insert(db).await.map_err(AppError::Database)
    }

    /// Checks credentials. `Ok(None)` covers unknown usernames, wrong
    /// passwords and deactivated accounts alike.
    pub async fn authenticate(
        db: &DatabaseConnection,
        username: &str,
        password: &str,
    ) -> Result<Option<user::Model>, AppError> {
        let Some(user) = Self::find_by_username(db, username).await? else {
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash) || !user.is_active {
            return Ok(None);
        }

        Ok(Some(user))
    }
}
