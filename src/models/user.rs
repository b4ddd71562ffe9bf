//! User domain models

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::group::Group;

/// Origin tag for locally created principals
pub const LOCAL_SOURCE: &str = "LOCAL";

/// Allowed login characters
pub static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid login regex"));

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,

    // Name parts
    pub prefix: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,

    // Organisation
    pub department: Option<String>,
    pub division: Option<String>,
    pub comment: Option<String>,
    pub source: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "Last First Middle" with the missing middle name trimmed away
    pub fn display_name(&self) -> String {
        format!(
            "{} {} {}",
            self.last_name,
            self.first_name,
            self.middle_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }
}

/// Create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 64), regex(path = *LOGIN_PATTERN))]
    pub login: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    pub prefix: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub last_name: String,
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,
    pub department: Option<String>,
    pub division: Option<String>,
    pub comment: Option<String>,
    pub source: Option<String>,
}

/// New user row handed to the store (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub email: String,
    pub password_hash: String,
    pub prefix: Option<String>,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,
    pub department: Option<String>,
    pub division: Option<String>,
    pub comment: Option<String>,
    pub source: String,
}

impl NewUser {
    pub fn from_request(req: CreateUserRequest, password_hash: String) -> Self {
        Self {
            login: req.login,
            email: req.email,
            password_hash,
            prefix: req.prefix,
            last_name: req.last_name,
            first_name: req.first_name,
            middle_name: req.middle_name,
            suffix: req.suffix,
            department: req.department,
            division: req.division,
            comment: req.comment,
            source: req.source.unwrap_or_else(|| LOCAL_SOURCE.to_string()),
        }
    }
}

/// Update user request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub prefix: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub suffix: Option<String>,
    pub department: Option<String>,
    pub division: Option<String>,
    pub comment: Option<String>,
}

/// User with the groups they directly belong to
#[derive(Debug, Serialize)]
pub struct UserWithGroups {
    #[serde(flatten)]
    pub user: User,
    pub groups: Vec<Group>,
}
