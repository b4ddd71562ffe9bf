//! 服务目录的 HTTP 处理器

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::AppError, middleware::AppState, models::catalog::*, repository::Store};

/// 列出服务及其资源
pub async fn list_services<S: Store>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, AppError> {
    let services = state.catalog_service.list_services().await?;

    Ok(Json(services))
}

/// 创建服务
pub async fn create_service<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.catalog_service.create_service(req).await?;

    Ok((StatusCode::CREATED, Json(service)))
}

/// 获取服务详情
pub async fn get_service<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.catalog_service.get_service(id).await?;

    Ok(Json(service))
}

/// 更新服务
pub async fn update_service<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.catalog_service.update_service(id, req).await?;

    Ok(Json(service))
}

/// 切换启用状态
pub async fn toggle_service<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let service = state.catalog_service.toggle_service(id).await?;

    Ok(Json(service))
}

/// 删除服务（级联）
pub async fn delete_service<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.catalog_service.delete_service(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 服务下各资源的权限
pub async fn get_service_access<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let grants = state.access_service.service_access(id).await?;

    Ok(Json(grants))
}
