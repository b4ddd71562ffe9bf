//! 测试公共模块
//! 提供基于内存存储的应用状态与数据构造工具

#![allow(dead_code)]

use access_console::{
    auth::PasswordHasher,
    config::{
        AccessConfig, AppConfig, DatabaseConfig, LoggingConfig, SecurityConfig, ServerConfig,
        StoreBackend, StoreConfig,
    },
    middleware::AppState,
    models::{
        access::{Access, AccessType, CreateAccessRequest, SubjectKind},
        catalog::{CreateResourceRequest, CreateServiceRequest, Resource, Service},
        group::{CreateGroupRequest, Group},
        user::{NewUser, User, LOCAL_SOURCE},
    },
    repository::{
        AccessRepository, CatalogRepository, GroupRepository, MemoryStore, Store, Transaction,
        UserRepository,
    },
};
use secrecy::Secret;
use std::sync::Arc;
use uuid::Uuid;

pub type TestState = Arc<AppState<MemoryStore>>;

/// 创建测试配置（内存存储）
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            graceful_shutdown_timeout_secs: 5,
        },
        database: DatabaseConfig {
            url: Secret::new(String::new()),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 5,
            idle_timeout_secs: 300,
            max_lifetime_secs: 1800,
        },
        store: StoreConfig {
            backend: StoreBackend::Memory,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            trust_proxy: false,
            ..SecurityConfig::default()
        },
        access: AccessConfig::default(),
    }
}

/// 低成本的哈希参数，避免拖慢测试
pub fn fast_hasher() -> PasswordHasher {
    PasswordHasher::with_params(1024, 1, 1)
}

pub fn create_test_app_state() -> TestState {
    create_test_app_state_with(create_test_config())
}

pub fn create_test_app_state_with(config: AppConfig) -> TestState {
    Arc::new(AppState::new(config, MemoryStore::new(), fast_hasher()))
}

/// 开启沿组嵌套关系展开的权限解析
pub fn transitive_config() -> AppConfig {
    let mut config = create_test_config();
    config.access.transitive_groups = true;
    config
}

// ==================== 数据构造 ====================

pub async fn seed_user(state: &TestState, login: &str, last_name: &str, first_name: &str) -> User {
    let mut tx = state.store.begin().await.unwrap();
    let user = tx
        .insert_user(&NewUser {
            login: login.to_string(),
            email: format!("{}@example.com", login),
            password_hash: "$argon2id$test".to_string(),
            prefix: None,
            last_name: last_name.to_string(),
            first_name: first_name.to_string(),
            middle_name: None,
            suffix: None,
            department: None,
            division: None,
            comment: None,
            source: LOCAL_SOURCE.to_string(),
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    user
}

pub async fn seed_group(state: &TestState, name: &str) -> Group {
    let mut tx = state.store.begin().await.unwrap();
    let group = tx
        .insert_group(&CreateGroupRequest {
            name: name.to_string(),
            description: None,
            comment: None,
            source: None,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    group
}

pub async fn seed_service(state: &TestState, name: &str) -> Service {
    let mut tx = state.store.begin().await.unwrap();
    let service = tx
        .insert_service(&CreateServiceRequest {
            name: name.to_string(),
            description: None,
            enabled: None,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    service
}

pub async fn seed_resource(state: &TestState, service_id: Uuid, name: &str) -> Resource {
    let mut tx = state.store.begin().await.unwrap();
    let resource = tx
        .insert_resource(&CreateResourceRequest {
            service_id,
            name: name.to_string(),
            description: None,
        })
        .await
        .unwrap();
    tx.commit().await.unwrap();
    resource
}

pub fn access_request(
    user_type: SubjectKind,
    source: Uuid,
    access_type: AccessType,
    name: &str,
) -> CreateAccessRequest {
    CreateAccessRequest {
        user_type,
        source,
        access_type,
        name: name.to_string(),
        category: None,
    }
}

pub async fn seed_access(state: &TestState, req: CreateAccessRequest) -> Access {
    let mut tx = state.store.begin().await.unwrap();
    let access = tx.insert_access(&req).await.unwrap();
    tx.commit().await.unwrap();
    access
}

pub async fn seed_group_access(
    state: &TestState,
    group_id: Uuid,
    access_type: AccessType,
    name: &str,
) -> Access {
    seed_access(state, access_request(SubjectKind::Group, group_id, access_type, name)).await
}

pub async fn seed_user_access(
    state: &TestState,
    user_id: Uuid,
    access_type: AccessType,
    name: &str,
) -> Access {
    seed_access(state, access_request(SubjectKind::User, user_id, access_type, name)).await
}

/// 当前全部嵌套关系边 (parent, child)
pub async fn relation_edges(state: &TestState) -> Vec<(Uuid, Uuid)> {
    let mut tx = state.store.begin().await.unwrap();
    let mut edges: Vec<(Uuid, Uuid)> = tx
        .relations()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.parent_group_id, r.child_group_id))
        .collect();
    edges.sort();
    edges
}

pub async fn access_exists(state: &TestState, access_id: Uuid) -> bool {
    let mut tx = state.store.begin().await.unwrap();
    tx.find_access(access_id).await.unwrap().is_some()
}
