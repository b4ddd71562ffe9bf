//! 资源与资源权限关联的 HTTP 处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::AppState,
    models::{access::SaveAccessRequest, catalog::*},
    repository::Store,
};

/// 创建资源
pub async fn create_resource<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.catalog_service.create_resource(req).await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// 获取资源
pub async fn get_resource<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.catalog_service.get_resource(id).await?;

    Ok(Json(resource))
}

/// 更新资源
pub async fn update_resource<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let resource = state.catalog_service.update_resource(id, req).await?;

    Ok(Json(resource))
}

/// 删除资源及其权限关联
pub async fn delete_resource<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_resource(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 资源上已关联的权限
pub async fn get_resource_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let access = state.access_service.access_for_resource(id).await?;

    Ok(Json(access))
}

/// 整体替换资源上的权限关联
pub async fn save_resource_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SaveAccessRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.grant_service.save_access(id, req.access_ids).await?;

    Ok(Json(outcome))
}

/// 移除单条权限关联
pub async fn unlink_resource_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, access_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.grant_service.unlink_access(id, access_id).await?;

    Ok(Json(json!({ "removed": removed })))
}
