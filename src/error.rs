//! 统一错误模型
//! 定义所有错误类型和错误响应格式

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 可被引用的实体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    User,
    Group,
    Service,
    Resource,
    Access,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::User => "User",
            Entity::Group => "Group",
            Entity::Service => "Service",
            Entity::Resource => "Resource",
            Entity::Access => "Access",
        };
        f.write_str(name)
    }
}

/// 应用错误类型
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: Uuid },

    #[error("User {user_id} is already a member of group {group_id}")]
    DuplicateMembership { group_id: Uuid, user_id: Uuid },

    #[error("Group {child_id} is already nested in group {parent_id}")]
    DuplicateRelation { parent_id: Uuid, child_id: Uuid },

    #[error("Group {0} cannot be nested in itself")]
    SelfRelation(Uuid),

    #[error("Nesting group {child_id} in group {parent_id} would create a cycle")]
    CycleDetected { parent_id: Uuid, child_id: Uuid },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Access denied")]
    Forbidden,

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// 获取 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::DuplicateMembership { .. }
            | AppError::DuplicateRelation { .. }
            | AppError::CycleDetected { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::SelfRelation(_) | AppError::Validation(_) | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 获取用户友好的错误消息（不包含敏感信息）
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound { entity, .. } => format!("{} not found", entity),
            AppError::DuplicateMembership { .. } => {
                "User is already a member of this group".to_string()
            }
            AppError::DuplicateRelation { .. } => {
                "Group is already nested in this group".to_string()
            }
            AppError::SelfRelation(_) => "A group cannot be nested in itself".to_string(),
            AppError::CycleDetected { .. } => {
                "Adding this group would create a membership cycle".to_string()
            }
            AppError::Conflict(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Forbidden => "Access denied".to_string(),
            AppError::Database(_) => "Database error occurred".to_string(),
            AppError::Config(_) => "Configuration error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> u16 {
        self.status_code().as_u16()
    }

    /// 是否为调用方可修正的校验类错误
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    // 便捷方法
    pub fn not_found(entity: Entity, id: Uuid) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn validation(msg: &str) -> Self {
        AppError::Validation(msg.to_string())
    }

    pub fn conflict(msg: &str) -> Self {
        AppError::Conflict(msg.to_string())
    }
}

/// 错误响应 DTO
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
    pub request_id: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = Uuid::new_v4().to_string();

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: self.code(),
                message: self.user_message(),
                request_id,
            },
        };

        // 记录错误日志
        if status.is_server_error() {
            tracing::error!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Application error"
            );
        } else {
            tracing::warn!(
                code = self.code(),
                message = %self,
                request_id = %error_response.error.request_id,
                "Request rejected"
            );
        }

        (status, Json(error_response)).into_response()
    }
}

/// 从 String 转换为 AppError::Config
impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Config(s)
    }
}

/// 从 config::ConfigError 转换
impl From<config::ConfigError> for AppError {
    fn from(e: config::ConfigError) -> Self {
        AppError::Config(e.to_string())
    }
}

/// 从 validator 校验错误转换
impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}
