//! User registration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::{FieldErrors, ValidationError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Check a registration form.
///
/// ## Rules
/// - name, email, password required
/// - email contains `@`
/// - password and confirmation match
pub fn validate_registration(request: &RegistrationRequest) -> Result<(), ValidationError> {
    let mut errors = FieldErrors::new();
    errors.require("name", request.name.trim(), "Name is required.");
    errors.require("email", request.email.trim(), "Email is required.");
    if !request.email.trim().is_empty() && !request.email.contains('@') {
        errors.add("email", "Email address is invalid.");
    }
    errors.require("password", &request.password, "Password is required.");
    if request.password != request.confirm_password {
        errors.add("confirm_password", "Passwords do not match");
    }
    errors.into_result()
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Build a user from a validated request, hashing the password.
    pub fn register(request: RegistrationRequest, created_at: DateTime<Utc>) -> Result<Self, AppError> {
        validate_registration(&request)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            password_hash: hash_password(&request.password)?,
            created_at,
        })
    }
}

/// Register from an async handler. Argon2 hashing runs on the blocking pool.
pub async fn register_user(
    request: RegistrationRequest,
    created_at: DateTime<Utc>,
) -> Result<User, AppError> {
    validate_registration(&request)?;
    tokio::task::spawn_blocking(move || User::register(request, created_at))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Hash a password for storage (argon2 PHC string).
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a password against its stored hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
