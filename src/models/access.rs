//! Access grant models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

/// Label shown for grants made to the user directly
pub const DIRECT_ASSIGNMENT: &str = "Прямое назначение";

/// Principal a grant applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "user_type", content = "source", rename_all = "UPPERCASE")]
pub enum Subject {
    User(Uuid),
    Group(Uuid),
}

impl Subject {
    pub fn id(&self) -> Uuid {
        match self {
            Subject::User(id) | Subject::Group(id) => *id,
        }
    }

    /// Stored discriminator (`USER` / `GROUP`)
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::User(_) => "USER",
            Subject::Group(_) => "GROUP",
        }
    }

    pub fn from_parts(kind: &str, id: Uuid) -> Result<Self, ParseAccessError> {
        match kind {
            "USER" => Ok(Subject::User(id)),
            "GROUP" => Ok(Subject::Group(id)),
            other => Err(ParseAccessError::SubjectType(other.to_string())),
        }
    }

    /// Human readable origin of a grant
    pub fn assigned_through(&self) -> String {
        match self {
            Subject::User(_) => DIRECT_ASSIGNMENT.to_string(),
            Subject::Group(id) => format!("Группа {}", id),
        }
    }
}

/// Permission level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AccessType {
    Read,
    Write,
    Admin,
}

impl AccessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessType::Read => "READ",
            AccessType::Write => "WRITE",
            AccessType::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessType {
    type Err = ParseAccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "READ" => Ok(AccessType::Read),
            "WRITE" => Ok(AccessType::Write),
            "ADMIN" => Ok(AccessType::Admin),
            _ => Err(ParseAccessError::AccessType(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseAccessError {
    #[error("unknown subject type: {0}")]
    SubjectType(String),
    #[error("unknown access type: {0}")]
    AccessType(String),
}

/// Map the access browser filter vocabulary to the stored category label.
/// Unknown values pass through unchanged.
pub fn category_label(filter_type: &str) -> String {
    match filter_type {
        "groups" => "Группы".to_string(),
        "roles" => "Роль".to_string(),
        "internal" => "Внутренний".to_string(),
        other => other.to_string(),
    }
}

/// Grant descriptor; effective on a resource once linked via `ResourceAccess`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Access {
    pub id: Uuid,
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(rename = "type")]
    pub access_type: AccessType,
    pub name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Access {
    /// Case-insensitive match over name, subject id and type
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.subject.id().to_string().contains(&query)
            || self.access_type.as_str().to_lowercase().contains(&query)
    }
}

impl<'r> FromRow<'r, PgRow> for Access {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let subject_type: String = row.try_get("subject_type")?;
        let subject_id: Uuid = row.try_get("subject_id")?;
        let access_type: String = row.try_get("access_type")?;

        let subject =
            Subject::from_parts(&subject_type, subject_id).map_err(|e| sqlx::Error::ColumnDecode {
                index: "subject_type".to_string(),
                source: Box::new(e),
            })?;
        let access_type = access_type.parse().map_err(|e| sqlx::Error::ColumnDecode {
            index: "access_type".to_string(),
            source: Box::new(e),
        })?;

        Ok(Access {
            id: row.try_get("id")?,
            subject,
            access_type,
            name: row.try_get("name")?,
            category: row.try_get("category")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Resource <-> access edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceAccess {
    pub resource_id: Uuid,
    pub access_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A linked grant with the names needed to describe it
#[derive(Debug, Clone)]
pub struct GrantRow {
    pub resource_name: String,
    pub service_name: String,
    pub access: Access,
}

/// One line of a user's effective access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveAccess {
    pub resource_name: String,
    pub service_name: String,
    pub access_type: AccessType,
    pub permission: String,
    pub assigned_through: String,
}

impl From<GrantRow> for EffectiveAccess {
    fn from(row: GrantRow) -> Self {
        Self {
            resource_name: row.resource_name,
            service_name: row.service_name,
            access_type: row.access.access_type,
            permission: row.access.name,
            assigned_through: row.access.subject.assigned_through(),
        }
    }
}

/// Subject discriminator as sent by clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubjectKind {
    User,
    Group,
}

/// Create access request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAccessRequest {
    pub user_type: SubjectKind,
    pub source: Uuid,
    #[serde(rename = "type")]
    pub access_type: AccessType,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub category: Option<String>,
}

impl CreateAccessRequest {
    pub fn subject(&self) -> Subject {
        match self.user_type {
            SubjectKind::User => Subject::User(self.source),
            SubjectKind::Group => Subject::Group(self.source),
        }
    }
}

/// Access browser filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessFilter {
    #[serde(rename = "type")]
    pub filter_type: Option<String>,
    #[serde(rename = "q")]
    pub search: Option<String>,
    pub limit: Option<i64>,
}

/// Replace the full set of grants linked to a resource
#[derive(Debug, Clone, Deserialize)]
pub struct SaveAccessRequest {
    pub access_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveAccessOutcome {
    pub success: bool,
    pub linked: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_serialization() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(Subject::Group(id)).unwrap();
        assert_eq!(json["user_type"], "GROUP");
        assert_eq!(json["source"], id.to_string());

        let back: Subject = serde_json::from_value(json).unwrap();
        assert_eq!(back, Subject::Group(id));
    }

    #[test]
    fn test_access_serializes_flat() {
        let id = Uuid::new_v4();
        let access = Access {
            id: Uuid::new_v4(),
            subject: Subject::User(id),
            access_type: AccessType::Read,
            name: "Read Access".to_string(),
            category: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&access).unwrap();
        assert_eq!(json["user_type"], "USER");
        assert_eq!(json["source"], id.to_string());
        assert_eq!(json["type"], "READ");
        assert!(access.matches("read"));
        assert!(access.matches(&id.to_string()[..8]));
        assert!(!access.matches("write"));
    }

    #[test]
    fn test_subject_parts() {
        let id = Uuid::new_v4();
        assert_eq!(Subject::from_parts("USER", id).unwrap(), Subject::User(id));
        assert_eq!(Subject::from_parts("GROUP", id).unwrap().kind(), "GROUP");
        assert!(Subject::from_parts("Группы", id).is_err());
    }

    #[test]
    fn test_assigned_through_labels() {
        let id = Uuid::new_v4();
        assert_eq!(Subject::User(id).assigned_through(), DIRECT_ASSIGNMENT);
        assert_eq!(Subject::Group(id).assigned_through(), format!("Группа {}", id));
    }

    #[test]
    fn test_access_type_parse() {
        assert_eq!("write".parse::<AccessType>().unwrap(), AccessType::Write);
        assert_eq!(AccessType::Admin.to_string(), "ADMIN");
        assert!("OWNER".parse::<AccessType>().is_err());
    }

    #[test]
    fn test_category_label_mapping() {
        assert_eq!(category_label("groups"), "Группы");
        assert_eq!(category_label("roles"), "Роль");
        assert_eq!(category_label("internal"), "Внутренний");
        assert_eq!(category_label("custom"), "custom");
    }

    #[test]
    fn test_create_access_request_deserialization() {
        let id = Uuid::new_v4();
        let json = format!(
            r#"{{"user_type":"GROUP","source":"{}","type":"WRITE","name":"Deploy Write"}}"#,
            id
        );
        let req: CreateAccessRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.subject(), Subject::Group(id));
        assert_eq!(req.access_type, AccessType::Write);
        assert!(req.category.is_none());
    }
}
