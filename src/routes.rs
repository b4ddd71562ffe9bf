//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::{handlers, middleware::AppState, repository::Store};

/// 请求体上限
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// 创建应用路由
pub fn create_router<S: Store>(state: Arc<AppState<S>>) -> Router {
    let security = Arc::new(state.config.security.clone());

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check::<S>));

    let api_routes = Router::new()
        // 用户
        .route(
            "/api/v1/users",
            get(handlers::user::list_users::<S>).post(handlers::user::create_user::<S>),
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::user::get_user::<S>)
                .put(handlers::user::update_user::<S>)
                .delete(handlers::user::delete_user::<S>),
        )
        .route("/api/v1/users/{id}/access", get(handlers::user::get_user_access::<S>))
        // 组
        .route(
            "/api/v1/groups",
            get(handlers::group::list_groups::<S>).post(handlers::group::create_group::<S>),
        )
        .route(
            "/api/v1/groups/{id}",
            get(handlers::group::get_group::<S>)
                .put(handlers::group::update_group::<S>)
                .delete(handlers::group::delete_group::<S>),
        )
        .route("/api/v1/groups/{id}/members", get(handlers::group::list_members::<S>))
        .route(
            "/api/v1/groups/{id}/users/{user_id}",
            post(handlers::group::add_member::<S>).delete(handlers::group::remove_member::<S>),
        )
        .route(
            "/api/v1/groups/{id}/groups/{child_id}",
            post(handlers::group::add_child::<S>).delete(handlers::group::remove_child::<S>),
        )
        .route("/api/v1/groups/{id}/exclude", get(handlers::group::list_excluding::<S>))
        .route("/api/v1/groups/{id}/candidates", get(handlers::group::list_candidates::<S>))
        // 服务
        .route(
            "/api/v1/services",
            get(handlers::service::list_services::<S>)
                .post(handlers::service::create_service::<S>),
        )
        .route(
            "/api/v1/services/{id}",
            get(handlers::service::get_service::<S>)
                .put(handlers::service::update_service::<S>)
                .delete(handlers::service::delete_service::<S>),
        )
        .route("/api/v1/services/{id}/toggle", post(handlers::service::toggle_service::<S>))
        .route("/api/v1/services/{id}/access", get(handlers::service::get_service_access::<S>))
        // 资源
        .route("/api/v1/resources", post(handlers::resource::create_resource::<S>))
        .route(
            "/api/v1/resources/{id}",
            get(handlers::resource::get_resource::<S>)
                .put(handlers::resource::update_resource::<S>)
                .delete(handlers::resource::delete_resource::<S>),
        )
        .route(
            "/api/v1/resources/{id}/access",
            get(handlers::resource::get_resource_access::<S>)
                .put(handlers::resource::save_resource_access::<S>),
        )
        .route(
            "/api/v1/resources/{id}/access/{access_id}",
            axum::routing::delete(handlers::resource::unlink_resource_access::<S>),
        )
        // 权限
        .route(
            "/api/v1/access",
            get(handlers::access::list_access::<S>).post(handlers::access::create_access::<S>),
        )
        .route("/api/v1/access/search", get(handlers::access::search_access::<S>))
        .route(
            "/api/v1/access/{id}",
            get(handlers::access::get_access::<S>).delete(handlers::access::remove_access::<S>),
        )
        .layer(axum::middleware::from_fn_with_state(
            security,
            crate::middleware::ip_whitelist_middleware,
        ));

    // 组合所有路由
    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
