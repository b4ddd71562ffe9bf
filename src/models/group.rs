//! Group domain models: groups, memberships and nesting relations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::page::contains_ci;

/// Group of users and (nested) groups
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    /// Local or externally synchronized origin
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Case-insensitive substring match over name and description
    pub fn matches(&self, query: &str) -> bool {
        contains_ci(&self.name, query)
            || self
                .description
                .as_deref()
                .is_some_and(|d| contains_ci(d, query))
    }
}

/// User <-> group edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMembership {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Directed edge: `child_group_id` is nested inside `parent_group_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupRelation {
    pub parent_group_id: Uuid,
    pub child_group_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A visible member of a group (one level, no recursive expansion)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GroupMember {
    User { id: Uuid, name: String },
    Group { id: Uuid, name: String },
}

impl GroupMember {
    pub fn id(&self) -> Uuid {
        match self {
            GroupMember::User { id, .. } | GroupMember::Group { id, .. } => *id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            GroupMember::User { name, .. } | GroupMember::Group { name, .. } => name,
        }
    }
}

/// Group together with its visible members
#[derive(Debug, Serialize)]
pub struct GroupDetail {
    #[serde(flatten)]
    pub group: Group,
    pub members: Vec<GroupMember>,
}

/// Create group request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub source: Option<String>,
}

/// Update group request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
}
