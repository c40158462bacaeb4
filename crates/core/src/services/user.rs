//! User account service: registration, credential checks, profile updates.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use minsu_common::{AppError, AppResult, IdGenerator};
use minsu_db::{entities::user, repositories::UserRepository};

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 256, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 128, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128, message = "Last name is required"))]
    pub last_name: String,

    #[validate(length(max = 128))]
    pub department: Option<String>,

    #[validate(length(max = 128))]
    pub campus: Option<String>,
}

/// Input for updating profile fields. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,

    #[validate(length(max = 128))]
    pub department: Option<String>,

    #[validate(length(max = 128))]
    pub campus: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email.clone()),
            email_lower: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            department: Set(input.department),
            campus: Set(input.campus),
            is_admin: Set(false),
            is_banned: Set(false),
            is_deactivated: Set(false),
            is_deleted: Set(false),
            ban_reason: Set(None),
            banned_by: Set(None),
            banned_at: Set(None),
            deactivate_reason: Set(None),
            deactivated_by: Set(None),
            deactivated_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            last_active_at: Set(None),
            updated_at: Set(None),
        };

        self.user_repo.create(model).await
    }

    /// Verify login credentials and return the account.
    ///
    /// Bad email or password both map to the same `Unauthorized` error.
    /// Banned, deactivated and deleted accounts cannot authenticate.
    pub async fn verify_credentials(&self, email: &str, password: &str) -> AppResult<user::Model> {
        let Some(found) = self.user_repo.find_by_email(email).await? else {
            return Err(AppError::Unauthorized);
        };

        if !verify_password(password, &found.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if found.is_banned {
            return Err(AppError::Forbidden);
        }
        if found.is_deactivated || found.is_deleted {
            return Err(AppError::Forbidden);
        }

        Ok(found)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update profile fields of the given user.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let existing = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = existing.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(department) = input.department {
            active.department = Set(Some(department));
        }
        if let Some(campus) = input.campus {
            active.campus = Set(Some(campus));
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }

    /// Refresh `last_active_at`, called by the auth middleware.
    pub async fn touch_last_active(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.touch_last_active(user_id).await
    }

    /// List users for the admin dashboard.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<user::Model>> {
        self.user_repo.list(limit, offset).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password_correct() {
        let password = "correct horse battery staple";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("right password").unwrap();
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("anything", "not a phc string").is_err());
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            first_name: String::new(),
            last_name: "Reyes".to_string(),
            department: None,
            campus: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            email: "student@minsu.edu.ph".to_string(),
            password: "longenoughpassword".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Reyes".to_string(),
            department: Some("CCS".to_string()),
            campus: Some("Main".to_string()),
        };
        assert!(input.validate().is_ok());
    }
}
