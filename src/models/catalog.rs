//! Service and resource models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::access::Access;

/// Service owning resources
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Resource inside exactly one service
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub service_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service with its resources
#[derive(Debug, Serialize)]
pub struct ServiceWithResources {
    #[serde(flatten)]
    pub service: Service,
    pub resources: Vec<Resource>,
}

/// Resource with the grants linked to it
#[derive(Debug, Serialize)]
pub struct ResourceGrants {
    pub resource: Resource,
    pub access: Vec<Access>,
}

/// Create service request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Update service request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
}

/// Create resource request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResourceRequest {
    pub service_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
}

/// Update resource request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResourceRequest {
    pub service_id: Option<Uuid>,
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
}
