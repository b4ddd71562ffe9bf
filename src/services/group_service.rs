//! 组关系服务
//!
//! 负责成员关系与组嵌套关系的增删、环检测和闭包查询。所有写操作在单个事务内完成，
//! 嵌套关系的写入先获取关系图锁，再基于完整边集做可达性检查。

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Entity, Result},
    graph::GroupGraph,
    models::{
        access::Subject,
        group::*,
        page::{normalize_search, Page, PageRequest},
    },
    repository::{AccessRepository, GroupRepository, Store, Transaction, UserRepository},
};

pub struct GroupService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> GroupService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ==================== Memberships ====================

    /// 将用户加入组
    pub async fn add_membership(&self, group_id: Uuid, user_id: Uuid) -> Result<GroupMembership> {
        let mut tx = self.store.begin().await?;

        require_group(&mut tx, group_id).await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found(Entity::User, user_id));
        }
        if tx.find_membership(group_id, user_id).await?.is_some() {
            return Err(AppError::DuplicateMembership { group_id, user_id });
        }

        let membership = tx.insert_membership(group_id, user_id).await?;
        tx.commit().await?;

        tracing::info!(group_id = %group_id, user_id = %user_id, "User added to group");
        Ok(membership)
    }

    /// 将用户移出组；不存在的成员关系返回 0
    pub async fn remove_membership(&self, group_id: Uuid, user_id: Uuid) -> Result<u64> {
        let mut tx = self.store.begin().await?;
        let removed = tx.delete_membership(group_id, user_id).await?;
        tx.commit().await?;

        if removed > 0 {
            tracing::info!(group_id = %group_id, user_id = %user_id, "User removed from group");
        }
        Ok(removed)
    }

    // ==================== Relations ====================

    /// 将 child 组嵌套到 parent 组中
    pub async fn add_group_relation(&self, parent_id: Uuid, child_id: Uuid) -> Result<GroupRelation> {
        if parent_id == child_id {
            return Err(AppError::SelfRelation(parent_id));
        }

        let mut tx = self.store.begin().await?;
        tx.lock_relations().await?;

        require_group(&mut tx, parent_id).await?;
        require_group(&mut tx, child_id).await?;

        let graph = GroupGraph::from_relations(&tx.relations().await?);

        if graph.contains_edge(parent_id, child_id) {
            return Err(AppError::DuplicateRelation {
                parent_id,
                child_id,
            });
        }

        if graph.would_create_cycle(parent_id, child_id) {
            tracing::warn!(
                parent_id = %parent_id,
                child_id = %child_id,
                "Rejected group relation: cycle"
            );
            return Err(AppError::CycleDetected {
                parent_id,
                child_id,
            });
        }

        let relation = tx.insert_relation(parent_id, child_id).await?;
        tx.commit().await?;

        tracing::info!(parent_id = %parent_id, child_id = %child_id, "Group relation added");
        Ok(relation)
    }

    /// 删除一条嵌套关系；不存在时返回 0
    pub async fn remove_group_relation(&self, parent_id: Uuid, child_id: Uuid) -> Result<u64> {
        let mut tx = self.store.begin().await?;
        tx.lock_relations().await?;
        let removed = tx.delete_relation(parent_id, child_id).await?;
        tx.commit().await?;

        if removed > 0 {
            tracing::info!(parent_id = %parent_id, child_id = %child_id, "Group relation removed");
        }
        Ok(removed)
    }

    /// 除 `exclude_id` 本身及其直接子组外的全部组（按名称排序）
    pub async fn descendants_excluding_ancestors_of(
        &self,
        exclude_id: Uuid,
        search: Option<String>,
    ) -> Result<Vec<Group>> {
        let mut tx = self.store.begin().await?;
        let groups = tx.all_groups().await?;
        let graph = GroupGraph::from_relations(&tx.relations().await?);
        let search = normalize_search(search);

        Ok(groups
            .into_iter()
            .filter(|g| g.id != exclude_id && !graph.parents_of(g.id).contains(&exclude_id))
            .filter(|g| search.as_deref().map_or(true, |q| g.matches(q)))
            .collect())
    }

    /// 可以作为 `group_id` 子组加入而不会失败的组
    pub async fn relation_candidates(
        &self,
        group_id: Uuid,
        search: Option<String>,
    ) -> Result<Vec<Group>> {
        let mut tx = self.store.begin().await?;
        require_group(&mut tx, group_id).await?;

        let groups = tx.all_groups().await?;
        let graph = GroupGraph::from_relations(&tx.relations().await?);
        let ancestors = graph.ancestors(group_id);
        let children: HashSet<Uuid> = graph.children_of(group_id).iter().copied().collect();
        let search = normalize_search(search);

        Ok(groups
            .into_iter()
            .filter(|g| g.id != group_id && !children.contains(&g.id) && !ancestors.contains(&g.id))
            .filter(|g| search.as_deref().map_or(true, |q| g.matches(q)))
            .collect())
    }

    /// 组的直接成员：先用户，后子组
    pub async fn members_of(&self, group_id: Uuid) -> Result<Vec<GroupMember>> {
        let mut tx = self.store.begin().await?;
        require_group(&mut tx, group_id).await?;
        collect_members(&mut tx, group_id).await
    }

    /// 组的全部祖先（按名称排序）
    pub async fn ancestors_of(&self, group_id: Uuid) -> Result<Vec<Group>> {
        self.closure_of(group_id, GroupGraph::ancestors).await
    }

    /// 组的全部后代（按名称排序）
    pub async fn descendants_of(&self, group_id: Uuid) -> Result<Vec<Group>> {
        self.closure_of(group_id, GroupGraph::descendants).await
    }

    async fn closure_of<F>(&self, group_id: Uuid, closure: F) -> Result<Vec<Group>>
    where
        F: Fn(&GroupGraph, Uuid) -> HashSet<Uuid>,
    {
        let mut tx = self.store.begin().await?;
        require_group(&mut tx, group_id).await?;

        let graph = GroupGraph::from_relations(&tx.relations().await?);
        let ids = closure(&graph, group_id);

        Ok(tx
            .all_groups()
            .await?
            .into_iter()
            .filter(|g| ids.contains(&g.id))
            .collect())
    }

    // ==================== Groups ====================

    /// 分页列出组
    pub async fn list_groups(&self, page: &PageRequest) -> Result<Page<Group>> {
        let mut tx = self.store.begin().await?;
        let (groups, total) = tx.list_groups(page).await?;
        Ok(Page::new(groups, total, page))
    }

    /// 获取组及其直接成员
    pub async fn get_group(&self, group_id: Uuid) -> Result<GroupDetail> {
        let mut tx = self.store.begin().await?;
        let group = require_group(&mut tx, group_id).await?;
        let members = collect_members(&mut tx, group_id).await?;
        Ok(GroupDetail { group, members })
    }

    pub async fn create_group(&self, req: CreateGroupRequest) -> Result<Group> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        let group = tx.insert_group(&req).await?;
        tx.commit().await?;

        tracing::info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    pub async fn update_group(&self, group_id: Uuid, req: UpdateGroupRequest) -> Result<Group> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        let group = tx
            .update_group(group_id, &req)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Group, group_id))?;
        tx.commit().await?;

        tracing::info!(group_id = %group_id, "Group updated");
        Ok(group)
    }

    /// 级联删除组：成员关系、嵌套关系、以该组为主体的权限及其资源关联
    pub async fn delete_group(&self, group_id: Uuid) -> Result<()> {
        let mut tx = self.store.begin().await?;
        tx.lock_relations().await?;
        require_group(&mut tx, group_id).await?;

        let memberships = tx.delete_memberships_of_group(group_id).await?;
        let relations = tx.delete_relations_of_group(group_id).await?;

        let access_ids = tx.access_ids_for_subject(Subject::Group(group_id)).await?;
        for access_id in &access_ids {
            tx.unlink_access(*access_id).await?;
            tx.delete_access(*access_id).await?;
        }

        tx.delete_group(group_id).await?;
        tx.commit().await?;

        tracing::info!(
            group_id = %group_id,
            memberships,
            relations,
            accesses = access_ids.len(),
            "Group deleted"
        );
        Ok(())
    }

    /// 用户直接所属的组
    pub async fn groups_of_user(&self, user_id: Uuid) -> Result<Vec<Group>> {
        let mut tx = self.store.begin().await?;
        if tx.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found(Entity::User, user_id));
        }
        tx.user_groups(user_id).await
    }
}

async fn require_group<T: Transaction>(tx: &mut T, group_id: Uuid) -> Result<Group> {
    tx.find_group(group_id)
        .await?
        .ok_or_else(|| AppError::not_found(Entity::Group, group_id))
}

async fn collect_members<T: Transaction>(tx: &mut T, group_id: Uuid) -> Result<Vec<GroupMember>> {
    let users = tx.group_users(group_id).await?;
    let groups = tx.child_groups(group_id).await?;

    let mut members: Vec<GroupMember> = users
        .into_iter()
        .map(|u| GroupMember::User {
            id: u.id,
            name: u.display_name(),
        })
        .collect();
    members.extend(groups.into_iter().map(|g| GroupMember::Group {
        id: g.id,
        name: g.name,
    }));

    Ok(members)
}
