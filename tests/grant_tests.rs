//! 授权管理与级联删除集成测试

use access_console::{
    error::AppError,
    models::{
        access::{AccessType, SubjectKind},
        user::CreateUserRequest,
    },
    repository::Store,
};
use uuid::Uuid;

mod common;
use common::*;

fn user_request(login: &str, email: &str, password: &str) -> CreateUserRequest {
    CreateUserRequest {
        login: login.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        prefix: None,
        last_name: "Иванов".to_string(),
        first_name: "Иван".to_string(),
        middle_name: Some("Иванович".to_string()),
        suffix: None,
        department: Some("IT".to_string()),
        division: None,
        comment: None,
        source: None,
    }
}

// ==================== save_access ====================

#[tokio::test]
async fn test_save_access_replaces_links() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;
    let b = seed_group_access(&state, group.id, AccessType::Write, "B").await;
    let c = seed_group_access(&state, group.id, AccessType::Admin, "C").await;

    let grants = &state.grant_service;
    grants.save_access(console.id, vec![a.id, b.id]).await.unwrap();

    let outcome = grants.save_access(console.id, vec![b.id, c.id]).await.unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.linked, 2);

    let linked = state.access_service.access_for_resource(console.id).await.unwrap();
    let ids: Vec<Uuid> = linked.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![b.id, c.id]);
}

#[tokio::test]
async fn test_save_access_collapses_duplicates() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;

    let outcome = state
        .grant_service
        .save_access(console.id, vec![a.id, a.id, a.id])
        .await
        .unwrap();
    assert_eq!(outcome.linked, 1);
    assert_eq!(
        state
            .access_service
            .access_for_resource(console.id)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_save_access_failure_keeps_existing_links() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;

    state.grant_service.save_access(console.id, vec![a.id]).await.unwrap();

    let missing = Uuid::new_v4();
    let result = state
        .grant_service
        .save_access(console.id, vec![missing])
        .await;
    assert!(matches!(result, Err(AppError::NotFound { id, .. }) if id == missing));

    let result = state
        .grant_service
        .save_access(Uuid::new_v4(), vec![a.id])
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let linked = state.access_service.access_for_resource(console.id).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, a.id);
}

#[tokio::test]
async fn test_save_empty_list_clears_links() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;

    state.grant_service.save_access(console.id, vec![a.id]).await.unwrap();
    let outcome = state.grant_service.save_access(console.id, vec![]).await.unwrap();

    assert!(outcome.success);
    assert_eq!(outcome.linked, 0);
    assert!(state
        .access_service
        .access_for_resource(console.id)
        .await
        .unwrap()
        .is_empty());
    // 权限描述本身保留
    assert!(access_exists(&state, a.id).await);
}

// ==================== Removal ====================

#[tokio::test]
async fn test_remove_access_grant() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let builds = seed_resource(&state, ci.id, "Builds").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;
    let b = seed_group_access(&state, group.id, AccessType::Write, "B").await;

    let grants = &state.grant_service;
    grants.save_access(console.id, vec![a.id, b.id]).await.unwrap();
    grants.save_access(builds.id, vec![a.id]).await.unwrap();

    // 只解除关联
    assert_eq!(grants.remove_access_grant(a.id, false).await.unwrap(), 2);
    assert!(access_exists(&state, a.id).await);
    assert_eq!(grants.remove_access_grant(a.id, false).await.unwrap(), 0);

    // 解除关联并删除描述
    assert_eq!(grants.remove_access_grant(b.id, true).await.unwrap(), 1);
    assert!(!access_exists(&state, b.id).await);

    assert!(matches!(
        grants.remove_access_grant(b.id, true).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(state
        .access_service
        .access_for_resource(console.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_unlink_single_access() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;
    let b = seed_group_access(&state, group.id, AccessType::Write, "B").await;

    state
        .grant_service
        .save_access(console.id, vec![a.id, b.id])
        .await
        .unwrap();

    assert_eq!(state.grant_service.unlink_access(console.id, a.id).await.unwrap(), 1);
    assert_eq!(state.grant_service.unlink_access(console.id, a.id).await.unwrap(), 0);

    let linked = state.access_service.access_for_resource(console.id).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, b.id);
}

// ==================== create_access ====================

#[tokio::test]
async fn test_create_access_requires_subject() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;

    let access = state
        .grant_service
        .create_access(access_request(SubjectKind::Group, group.id, AccessType::Write, "Deploy Write"))
        .await
        .unwrap();
    assert_eq!(access.subject.id(), group.id);
    assert_eq!(access.subject.kind(), "GROUP");

    state
        .grant_service
        .create_access(access_request(SubjectKind::User, alice.id, AccessType::Read, "Read"))
        .await
        .unwrap();

    // 组 ID 当作用户 ID 使用
    let result = state
        .grant_service
        .create_access(access_request(SubjectKind::User, group.id, AccessType::Read, "Wrong"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound { id, .. }) if id == group.id));

    let result = state
        .grant_service
        .create_access(access_request(SubjectKind::Group, Uuid::new_v4(), AccessType::Read, "X"))
        .await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[tokio::test]
async fn test_create_access_rejects_blank_name() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;

    for name in ["", "   "] {
        let result = state
            .grant_service
            .create_access(access_request(SubjectKind::Group, group.id, AccessType::Read, name))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}

// ==================== Cascades ====================

#[tokio::test]
async fn test_delete_user_cascades() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let direct = seed_user_access(&state, alice.id, AccessType::Read, "Direct").await;
    let shared = seed_group_access(&state, group.id, AccessType::Read, "Shared").await;

    state.group_service.add_membership(group.id, alice.id).await.unwrap();
    state
        .grant_service
        .save_access(console.id, vec![direct.id, shared.id])
        .await
        .unwrap();

    state.user_service.delete_user(alice.id).await.unwrap();

    assert!(!access_exists(&state, direct.id).await);
    assert!(access_exists(&state, shared.id).await);
    assert!(state.group_service.members_of(group.id).await.unwrap().is_empty());

    let linked = state.access_service.access_for_resource(console.id).await.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].id, shared.id);

    assert!(matches!(
        state.user_service.delete_user(alice.id).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_delete_service_cascades() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;

    state.grant_service.save_access(console.id, vec![a.id]).await.unwrap();
    state.catalog_service.delete_service(ci.id).await.unwrap();

    assert!(matches!(
        state.catalog_service.get_resource(console.id).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(matches!(
        state.catalog_service.get_service(ci.id).await,
        Err(AppError::NotFound { .. })
    ));
    assert!(access_exists(&state, a.id).await);
    assert_eq!(state.grant_service.remove_access_grant(a.id, false).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_resource_removes_links() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let a = seed_group_access(&state, group.id, AccessType::Read, "A").await;

    state.group_service.add_membership(group.id, alice.id).await.unwrap();
    state.grant_service.save_access(console.id, vec![a.id]).await.unwrap();
    assert_eq!(state.access_service.effective_access(alice.id).await.unwrap().len(), 1);

    state.catalog_service.delete_resource(console.id).await.unwrap();

    assert!(state.access_service.effective_access(alice.id).await.unwrap().is_empty());
    assert!(matches!(
        state.catalog_service.delete_resource(console.id).await,
        Err(AppError::NotFound { .. })
    ));
}

// ==================== Users and services ====================

#[tokio::test]
async fn test_create_user_enforces_policy_and_uniqueness() {
    let state = create_test_app_state();
    let users = &state.user_service;

    let user = users
        .create_user(user_request("ivanov", "ivanov@example.com", "Secret123"))
        .await
        .unwrap();
    assert_eq!(user.display_name(), "Иванов Иван Иванович");
    assert_eq!(user.source, "LOCAL");
    assert_ne!(user.password_hash, "Secret123");

    assert!(matches!(
        users
            .create_user(user_request("petrov", "petrov@example.com", "weak"))
            .await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        users
            .create_user(user_request("ivanov", "other@example.com", "Secret123"))
            .await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        users
            .create_user(user_request("ivanov2", "IVANOV@example.com", "Secret123"))
            .await,
        Err(AppError::Conflict(_))
    ));
    assert!(matches!(
        users
            .create_user(user_request("bad login", "x@example.com", "Secret123"))
            .await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_user_creation_keeps_login_unique() {
    let state = create_test_app_state();

    // 持有存储事务期间，两次创建都只能在事务外完成哈希
    let held = state.store.begin().await.unwrap();

    let spawn_create = |email: &'static str| {
        let state = state.clone();
        tokio::spawn(async move {
            state
                .user_service
                .create_user(user_request("ivanov", email, "Secret123"))
                .await
        })
    };
    let first = spawn_create("first@example.com");
    let second = spawn_create("second@example.com");

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(!first.is_finished());
    assert!(!second.is_finished());
    drop(held);

    let results = [first.await.unwrap(), second.await.unwrap()];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(r, Err(AppError::Conflict(_)))));
}

#[tokio::test]
async fn test_user_cascade_keeps_group_grant_with_same_id() {
    let state = create_test_app_state();
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let direct = seed_user_access(&state, alice.id, AccessType::Read, "Direct").await;
    // 组主体恰好与用户 ID 相同
    let group_grant = seed_group_access(&state, alice.id, AccessType::Read, "Group").await;

    state.user_service.delete_user(alice.id).await.unwrap();

    assert!(!access_exists(&state, direct.id).await);
    assert!(access_exists(&state, group_grant.id).await);
}

#[tokio::test]
async fn test_service_name_is_unique() {
    use access_console::models::catalog::CreateServiceRequest;

    let state = create_test_app_state();
    let request = CreateServiceRequest {
        name: "CI".to_string(),
        description: None,
        enabled: None,
    };

    let service = state.catalog_service.create_service(request.clone()).await.unwrap();
    assert!(service.enabled);

    assert!(matches!(
        state.catalog_service.create_service(request).await,
        Err(AppError::Conflict(_))
    ));

    let toggled = state.catalog_service.toggle_service(service.id).await.unwrap();
    assert!(!toggled.enabled);
}
