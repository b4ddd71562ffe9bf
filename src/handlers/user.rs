//! 用户管理的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        page::{ListQuery, PageRequest},
        user::*,
    },
    repository::Store,
};

/// 列出用户（分页）
pub async fn list_users<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::from_query(query, state.config.access.default_per_page);
    let users = state.user_service.list_users(&page).await?;

    Ok(Json(users))
}

/// 创建用户
pub async fn create_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.create_user(req).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// 获取用户详情（含直接所属的组）
pub async fn get_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.get_user(id).await?;

    Ok(Json(user))
}

/// 更新用户
pub async fn update_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.update_user(id, req).await?;

    Ok(Json(user))
}

/// 删除用户
pub async fn delete_user<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.user_service.delete_user(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 用户的有效权限
pub async fn get_user_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.access_service.effective_access(id).await?;

    Ok(Json(access))
}
