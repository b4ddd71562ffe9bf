//! 组与组关系的 HTTP 处理器

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use super::SearchQuery;
use crate::{
    error::AppError,
    middleware::AppState,
    models::{
        group::*,
        page::{ListQuery, PageRequest},
    },
    repository::Store,
};

// ==================== Groups ====================

/// 列出组（分页）
pub async fn list_groups<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = PageRequest::from_query(query, state.config.access.default_per_page);
    let groups = state.group_service.list_groups(&page).await?;

    Ok(Json(groups))
}

/// 创建组
pub async fn create_group<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group = state.group_service.create_group(req).await?;

    Ok((StatusCode::CREATED, Json(group)))
}

/// 获取组及其成员
pub async fn get_group<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = state.group_service.get_group(id).await?;

    Ok(Json(group))
}

/// 更新组
pub async fn update_group<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group = state.group_service.update_group(id, req).await?;

    Ok(Json(group))
}

/// 删除组（级联）
pub async fn delete_group<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.group_service.delete_group(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// 组的直接成员
pub async fn list_members<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let members = state.group_service.members_of(id).await?;

    Ok(Json(members))
}

// ==================== Memberships ====================

/// 将用户加入组
pub async fn add_member<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let membership = state.group_service.add_membership(id, user_id).await?;

    Ok((StatusCode::CREATED, Json(membership)))
}

/// 将用户移出组
pub async fn remove_member<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.group_service.remove_membership(id, user_id).await?;

    Ok(Json(json!({ "removed": removed })))
}

// ==================== Relations ====================

/// 嵌套子组
pub async fn add_child<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let relation = state.group_service.add_group_relation(id, child_id).await?;

    Ok((StatusCode::CREATED, Json(relation)))
}

/// 移除子组
pub async fn remove_child<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path((id, child_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let removed = state.group_service.remove_group_relation(id, child_id).await?;

    Ok(Json(json!({ "removed": removed })))
}

/// 排除自身及直接子组后的组列表
pub async fn list_excluding<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let groups = state
        .group_service
        .descendants_excluding_ancestors_of(id, query.search)
        .await?;

    Ok(Json(groups))
}

/// 可嵌套为子组的候选组
pub async fn list_candidates<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let groups = state
        .group_service
        .relation_candidates(id, query.search)
        .await?;

    Ok(Json(groups))
}
