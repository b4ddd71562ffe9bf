//! HTTP 中间件
//! 应用状态、请求追踪、IP 白名单

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::PasswordHasher,
    config::{AppConfig, SecurityConfig},
    error::AppError,
    repository::Store,
    services::{AccessService, CatalogService, GrantService, GroupService, UserService},
};

/// 应用状态
///
/// 服务之间共享同一个存储句柄；处理器通过 `State<Arc<AppState<S>>>` 访问。
pub struct AppState<S: Store> {
    pub config: AppConfig,
    pub store: Arc<S>,
    pub user_service: Arc<UserService<S>>,
    pub group_service: Arc<GroupService<S>>,
    pub catalog_service: Arc<CatalogService<S>>,
    pub access_service: Arc<AccessService<S>>,
    pub grant_service: Arc<GrantService<S>>,
}

impl<S: Store> AppState<S> {
    pub fn new(config: AppConfig, store: S, hasher: PasswordHasher) -> Self {
        let store = Arc::new(store);

        Self {
            user_service: Arc::new(UserService::new(
                store.clone(),
                hasher,
                config.security.clone(),
            )),
            group_service: Arc::new(GroupService::new(store.clone())),
            catalog_service: Arc::new(CatalogService::new(store.clone())),
            access_service: Arc::new(AccessService::new(store.clone(), config.access.clone())),
            grant_service: Arc::new(GrantService::new(store.clone())),
            store,
            config,
        }
    }
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录指标
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    let uri = req.uri().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    async move {
        let start = Instant::now();

        let mut response = next.run(req).await;

        let elapsed = start.elapsed();
        let status = response.status().as_u16();

        // 标签只使用静态字符串
        let method_name = match method.as_str() {
            "GET" => "GET",
            "POST" => "POST",
            "PUT" => "PUT",
            "DELETE" => "DELETE",
            "PATCH" => "PATCH",
            _ => "UNKNOWN",
        };
        let status_code = match status {
            200 => "200",
            201 => "201",
            204 => "204",
            400 => "400",
            403 => "403",
            404 => "404",
            409 => "409",
            422 => "422",
            500 => "500",
            _ => "other",
        };

        metrics::counter!("http_requests_total", "method" => method_name, "status" => status_code)
            .increment(1);
        metrics::histogram!("http_request_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            method = %method,
            uri = %uri,
            status = status,
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// IP 白名单中间件
pub async fn ip_whitelist_middleware(
    State(security): State<Arc<SecurityConfig>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(allowed_ips) = &security.allowed_ips {
        let client_ip = get_client_ip(req.headers(), security.trust_proxy);

        if !allowed_ips.contains(&client_ip) {
            tracing::warn!(client_ip = %client_ip, "IP not in whitelist");
            return Err(AppError::Forbidden);
        }

        tracing::debug!(client_ip = %client_ip, "IP allowed by whitelist");
    }

    Ok(next.run(req).await)
}

/// 获取客户端 IP 地址
fn get_client_ip(headers: &HeaderMap, trust_proxy: bool) -> String {
    if trust_proxy {
        // X-Forwarded-For 可能包含多个 IP，取第一个
        if let Some(first_ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
        {
            return first_ip.trim().to_string();
        }

        if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
            return real_ip.trim().to_string();
        }
    }

    "unknown".to_string()
}
