//! 权限解析集成测试

use access_console::{
    error::AppError,
    models::access::{AccessFilter, AccessType, SubjectKind, DIRECT_ASSIGNMENT},
};
use uuid::Uuid;

mod common;
use common::*;

#[tokio::test]
async fn test_effective_access_through_group() {
    let state = create_test_app_state();
    let engineering = seed_group(&state, "Engineering").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let access =
        seed_group_access(&state, engineering.id, AccessType::Write, "Deploy Write").await;

    state
        .group_service
        .add_membership(engineering.id, alice.id)
        .await
        .unwrap();
    state
        .grant_service
        .save_access(console.id, vec![access.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();

    assert_eq!(result.len(), 1);
    let line = &result[0];
    assert_eq!(line.resource_name, "Deploy Console");
    assert_eq!(line.service_name, "CI");
    assert_eq!(line.access_type, AccessType::Write);
    assert_eq!(line.permission, "Deploy Write");
    assert_eq!(line.assigned_through, format!("Группа {}", engineering.id));
}

#[tokio::test]
async fn test_direct_grant_is_labelled() {
    let state = create_test_app_state();
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let access = seed_user_access(&state, alice.id, AccessType::Admin, "Console Admin").await;

    state
        .grant_service
        .save_access(console.id, vec![access.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].assigned_through, DIRECT_ASSIGNMENT);
    assert_eq!(result[0].access_type, AccessType::Admin);
}

#[tokio::test]
async fn test_effective_access_excludes_foreign_and_unlinked_grants() {
    let state = create_test_app_state();
    let engineering = seed_group(&state, "Engineering").await;
    let finance = seed_group(&state, "Finance").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let bob = seed_user(&state, "bob", "Brown", "Bob").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;

    let finance_access = seed_group_access(&state, finance.id, AccessType::Read, "Ledger").await;
    let bob_access = seed_user_access(&state, bob.id, AccessType::Read, "Bob Read").await;
    // 存在但未关联到任何资源
    seed_group_access(&state, engineering.id, AccessType::Write, "Dangling").await;

    state
        .group_service
        .add_membership(engineering.id, alice.id)
        .await
        .unwrap();
    state
        .grant_service
        .save_access(console.id, vec![finance_access.id, bob_access.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();
    assert!(result.is_empty());

    let result = state.access_service.effective_access(bob.id).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].permission, "Bob Read");
}

#[tokio::test]
async fn test_effective_access_is_ordered() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let wiki = seed_service(&state, "Wiki").await;
    let pages = seed_resource(&state, wiki.id, "Pages").await;
    let builds = seed_resource(&state, ci.id, "Builds").await;

    let write = seed_group_access(&state, group.id, AccessType::Write, "Write").await;
    let read = seed_user_access(&state, alice.id, AccessType::Read, "Read").await;

    state
        .group_service
        .add_membership(group.id, alice.id)
        .await
        .unwrap();
    state
        .grant_service
        .save_access(pages.id, vec![write.id, read.id])
        .await
        .unwrap();
    state
        .grant_service
        .save_access(builds.id, vec![write.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();
    let lines: Vec<(&str, &str)> = result
        .iter()
        .map(|l| (l.resource_name.as_str(), l.permission.as_str()))
        .collect();

    assert_eq!(
        lines,
        vec![("Builds", "Write"), ("Pages", "Read"), ("Pages", "Write")]
    );
}

#[tokio::test]
async fn test_effective_access_unknown_user() {
    let state = create_test_app_state();
    let missing = Uuid::new_v4();

    let result = state.access_service.effective_access(missing).await;
    assert!(matches!(result, Err(AppError::NotFound { id, .. }) if id == missing));
}

#[tokio::test]
async fn test_nested_groups_are_not_expanded_by_default() {
    let state = create_test_app_state();
    let parent = seed_group(&state, "Engineering").await;
    let child = seed_group(&state, "Backend").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let access = seed_group_access(&state, parent.id, AccessType::Write, "Deploy Write").await;

    state.group_service.add_group_relation(parent.id, child.id).await.unwrap();
    state.group_service.add_membership(child.id, alice.id).await.unwrap();
    state
        .grant_service
        .save_access(console.id, vec![access.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn test_transitive_expansion_includes_ancestor_grants() {
    let state = create_test_app_state_with(transitive_config());
    let root = seed_group(&state, "Company").await;
    let parent = seed_group(&state, "Engineering").await;
    let child = seed_group(&state, "Backend").await;
    let alice = seed_user(&state, "alice", "Smith", "Alice").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let access = seed_group_access(&state, root.id, AccessType::Read, "Company Read").await;

    state.group_service.add_group_relation(root.id, parent.id).await.unwrap();
    state.group_service.add_group_relation(parent.id, child.id).await.unwrap();
    state.group_service.add_membership(child.id, alice.id).await.unwrap();
    state
        .grant_service
        .save_access(console.id, vec![access.id])
        .await
        .unwrap();

    let result = state.access_service.effective_access(alice.id).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].assigned_through, format!("Группа {}", root.id));
}

// ==================== Resource and service views ====================

#[tokio::test]
async fn test_access_for_resource() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    let other = seed_resource(&state, ci.id, "Artifacts").await;
    let write = seed_group_access(&state, group.id, AccessType::Write, "Deploy Write").await;
    let read = seed_group_access(&state, group.id, AccessType::Read, "Deploy Read").await;

    state
        .grant_service
        .save_access(console.id, vec![write.id, read.id])
        .await
        .unwrap();

    let linked = state.access_service.access_for_resource(console.id).await.unwrap();
    let names: Vec<&str> = linked.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["Deploy Read", "Deploy Write"]);

    assert!(state
        .access_service
        .access_for_resource(other.id)
        .await
        .unwrap()
        .is_empty());

    assert!(matches!(
        state.access_service.access_for_resource(Uuid::new_v4()).await,
        Err(AppError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_service_access_groups_by_resource() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;
    let ci = seed_service(&state, "CI").await;
    let console = seed_resource(&state, ci.id, "Deploy Console").await;
    seed_resource(&state, ci.id, "Artifacts").await;
    let write = seed_group_access(&state, group.id, AccessType::Write, "Deploy Write").await;

    state
        .grant_service
        .save_access(console.id, vec![write.id])
        .await
        .unwrap();

    let grants = state.access_service.service_access(ci.id).await.unwrap();
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0].resource.name, "Artifacts");
    assert!(grants[0].access.is_empty());
    assert_eq!(grants[1].resource.name, "Deploy Console");
    assert_eq!(grants[1].access[0].id, write.id);

    assert!(matches!(
        state.access_service.service_access(Uuid::new_v4()).await,
        Err(AppError::NotFound { .. })
    ));
}

// ==================== Access browser ====================

#[tokio::test]
async fn test_access_list_filters() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;

    let mut req = access_request(SubjectKind::Group, group.id, AccessType::Read, "Group Read");
    req.category = Some("Группы".to_string());
    seed_access(&state, req).await;

    let mut req = access_request(SubjectKind::Group, group.id, AccessType::Admin, "Ops Role");
    req.category = Some("Роль".to_string());
    seed_access(&state, req).await;

    seed_group_access(&state, group.id, AccessType::Write, "Plain Write").await;

    let service = &state.access_service;

    let all = service.access_list(AccessFilter::default()).await.unwrap();
    assert_eq!(all.len(), 3);

    let groups = service
        .access_list(AccessFilter {
            filter_type: Some("groups".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Group Read");

    let roles = service
        .access_list(AccessFilter {
            filter_type: Some("roles".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(roles[0].name, "Ops Role");

    let by_type = service
        .access_list(AccessFilter {
            search: Some("write".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_type.len(), 1);
    assert_eq!(by_type[0].name, "Plain Write");

    let limited = service
        .access_list(AccessFilter {
            limit: Some(2),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(limited.len(), 2);

    // 非正数的 limit 视为不限制
    let unlimited = service
        .access_list(AccessFilter {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(unlimited.len(), 3);
}

#[tokio::test]
async fn test_search_access_is_capped() {
    let state = create_test_app_state();
    let group = seed_group(&state, "Engineering").await;

    for i in 0..15 {
        seed_group_access(&state, group.id, AccessType::Read, &format!("Deploy {:02}", i)).await;
    }
    seed_group_access(&state, group.id, AccessType::Read, "Other").await;

    let found = state
        .access_service
        .search_access(Some("deploy".to_string()))
        .await
        .unwrap();
    assert_eq!(found.len(), 10);
    assert_eq!(found[0].name, "Deploy 00");

    let blank = state
        .access_service
        .search_access(Some("   ".to_string()))
        .await
        .unwrap();
    assert_eq!(blank.len(), 10);
}
