//! 权限浏览与授权的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::AppState,
    models::access::{AccessFilter, CreateAccessRequest},
    repository::Store,
};

#[derive(Debug, Deserialize)]
pub struct TypeaheadQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveGrantQuery {
    #[serde(default)]
    pub delete_record: bool,
}

/// 按分类与关键字列出权限
pub async fn list_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(filter): Query<AccessFilter>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.access_service.access_list(filter).await?;

    Ok(Json(access))
}

/// 创建权限描述
pub async fn create_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.grant_service.create_access(req).await?;

    Ok((StatusCode::CREATED, Json(access)))
}

/// 权限联想搜索
pub async fn search_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<TypeaheadQuery>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.access_service.search_access(query.q).await?;

    Ok(Json(access))
}

/// 获取权限描述
pub async fn get_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.access_service.get_access(id).await?;

    Ok(Json(access))
}

/// 移除权限的全部关联，可选删除权限描述本身
pub async fn remove_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RemoveGrantQuery>,
) -> Result<impl IntoResponse, AppError> {
    let unlinked = state
        .grant_service
        .remove_access_grant(id, query.delete_record)
        .await?;

    Ok(Json(json!({
        "unlinked": unlinked,
        "deleted": query.delete_record
    })))
}
