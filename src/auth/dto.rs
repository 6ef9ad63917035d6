use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// Validation rules attached to the auth contracts.
pub const NAME_MIN_CHARS: usize = 3;
pub const PASSWORD_MIN_CHARS: usize = 5;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Normalize and check the request against the declared rules.
    pub fn validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();

        if self.name.chars().count() < NAME_MIN_CHARS {
            return Err(ApiError::bad_request(format!(
                "Name must not be less than {NAME_MIN_CHARS} characters"
            )));
        }
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ApiError::bad_request(format!(
                "Password cannot be less than {PASSWORD_MIN_CHARS} characters"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&mut self) -> Result<(), ApiError> {
        self.email = self.email.trim().to_lowercase();
        if !is_valid_email(&self.email) {
            return Err(ApiError::bad_request("Invalid email"));
        }
        Ok(())
    }
}

/// Public view of a freshly registered account.
#[derive(Debug, Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}
