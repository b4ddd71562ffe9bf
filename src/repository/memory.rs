//! 内存存储后端
//!
//! 主要用于测试环境与无数据库的本地运行。整个状态由一把互斥锁保护，
//! 事务持有锁直到提交或丢弃，因此事务之间完全串行。

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    AccessRepository, CatalogRepository, GroupRepository, Store, Transaction, UserRepository,
};
use crate::{
    error::{AppError, Result},
    models::{
        access::{Access, CreateAccessRequest, GrantRow, ResourceAccess, Subject},
        catalog::*,
        group::*,
        page::{contains_ci, PageRequest},
        user::*,
    },
};

/// 全部实体的快照
#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    memberships: Vec<GroupMembership>,
    relations: Vec<GroupRelation>,
    services: HashMap<Uuid, Service>,
    resources: HashMap<Uuid, Resource>,
    accesses: HashMap<Uuid, Access>,
    links: Vec<ResourceAccess>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> Result<MemoryTx> {
        let guard = self.state.clone().lock_owned().await;
        let work = guard.clone();
        Ok(MemoryTx { guard, work })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// 持有存储锁的事务；修改作用于工作副本，提交时整体写回
pub struct MemoryTx {
    guard: OwnedMutexGuard<MemoryState>,
    work: MemoryState,
}

#[async_trait]
impl Transaction for MemoryTx {
    async fn commit(mut self) -> Result<()> {
        *self.guard = std::mem::take(&mut self.work);
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        Ok(())
    }
}

fn page_of<T: Clone>(mut items: Vec<T>, page: &PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let start = usize::try_from(page.offset()).map_or(items.len(), |o| o.min(items.len()));
    let end = (start + page.limit() as usize).min(items.len());
    (items.drain(start..end).collect(), total)
}

fn sort_users(users: &mut [User]) {
    users.sort_by(|a, b| {
        (&a.last_name, &a.first_name, &a.login).cmp(&(&b.last_name, &b.first_name, &b.login))
    });
}

fn sort_groups(groups: &mut [Group]) {
    groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
}

fn removed(before: usize, after: usize) -> u64 {
    (before - after) as u64
}

#[async_trait]
impl UserRepository for MemoryTx {
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>> {
        Ok(self.work.users.values().find(|u| u.login == login).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self
            .work
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&mut self, page: &PageRequest) -> Result<(Vec<User>, i64)> {
        let mut users: Vec<User> = self
            .work
            .users
            .values()
            .filter(|u| match page.search.as_deref() {
                Some(q) => {
                    contains_ci(&u.first_name, q)
                        || contains_ci(&u.last_name, q)
                        || contains_ci(&u.login, q)
                        || u.department.as_deref().is_some_and(|d| contains_ci(d, q))
                }
                None => true,
            })
            .cloned()
            .collect();
        sort_users(&mut users);
        Ok(page_of(users, page))
    }

    async fn insert_user(&mut self, user: &NewUser) -> Result<User> {
        if self.work.users.values().any(|u| u.login == user.login) {
            return Err(AppError::conflict("Login already exists"));
        }
        if self
            .work
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::conflict("Email already exists"));
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            login: user.login.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            prefix: user.prefix.clone(),
            last_name: user.last_name.clone(),
            first_name: user.first_name.clone(),
            middle_name: user.middle_name.clone(),
            suffix: user.suffix.clone(),
            department: user.department.clone(),
            division: user.division.clone(),
            comment: user.comment.clone(),
            source: user.source.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_user(&mut self, id: Uuid, req: &UpdateUserRequest) -> Result<Option<User>> {
        if let Some(email) = &req.email {
            if self
                .work
                .users
                .values()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(AppError::conflict("Email already exists"));
            }
        }

        let Some(user) = self.work.users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(v) = &req.email {
            user.email = v.clone();
        }
        if let Some(v) = &req.last_name {
            user.last_name = v.clone();
        }
        if let Some(v) = &req.first_name {
            user.first_name = v.clone();
        }
        if req.prefix.is_some() {
            user.prefix = req.prefix.clone();
        }
        if req.middle_name.is_some() {
            user.middle_name = req.middle_name.clone();
        }
        if req.suffix.is_some() {
            user.suffix = req.suffix.clone();
        }
        if req.department.is_some() {
            user.department = req.department.clone();
        }
        if req.division.is_some() {
            user.division = req.division.clone();
        }
        if req.comment.is_some() {
            user.comment = req.comment.clone();
        }
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<u64> {
        Ok(self.work.users.remove(&id).map_or(0, |_| 1))
    }
}

#[async_trait]
impl GroupRepository for MemoryTx {
    async fn find_group(&mut self, id: Uuid) -> Result<Option<Group>> {
        Ok(self.work.groups.get(&id).cloned())
    }

    async fn list_groups(&mut self, page: &PageRequest) -> Result<(Vec<Group>, i64)> {
        let mut groups: Vec<Group> = self
            .work
            .groups
            .values()
            .filter(|g| match page.search.as_deref() {
                Some(q) => g.matches(q),
                None => true,
            })
            .cloned()
            .collect();
        sort_groups(&mut groups);
        Ok(page_of(groups, page))
    }

    async fn all_groups(&mut self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self.work.groups.values().cloned().collect();
        sort_groups(&mut groups);
        Ok(groups)
    }

    async fn insert_group(&mut self, req: &CreateGroupRequest) -> Result<Group> {
        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: req.description.clone(),
            comment: req.comment.clone(),
            source: req
                .source
                .clone()
                .unwrap_or_else(|| LOCAL_SOURCE.to_string()),
            created_at: now,
            updated_at: now,
        };
        self.work.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn update_group(&mut self, id: Uuid, req: &UpdateGroupRequest) -> Result<Option<Group>> {
        let Some(group) = self.work.groups.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            group.name = name.clone();
        }
        if req.description.is_some() {
            group.description = req.description.clone();
        }
        if req.comment.is_some() {
            group.comment = req.comment.clone();
        }
        group.updated_at = Utc::now();

        Ok(Some(group.clone()))
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<u64> {
        Ok(self.work.groups.remove(&id).map_or(0, |_| 1))
    }

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>> {
        Ok(self
            .work
            .memberships
            .iter()
            .find(|m| m.group_id == group_id && m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMembership> {
        if self
            .work
            .memberships
            .iter()
            .any(|m| m.group_id == group_id && m.user_id == user_id)
        {
            return Err(AppError::DuplicateMembership { group_id, user_id });
        }

        let membership = GroupMembership {
            group_id,
            user_id,
            created_at: Utc::now(),
        };
        self.work.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn delete_membership(&mut self, group_id: Uuid, user_id: Uuid) -> Result<u64> {
        let before = self.work.memberships.len();
        self.work
            .memberships
            .retain(|m| !(m.group_id == group_id && m.user_id == user_id));
        Ok(removed(before, self.work.memberships.len()))
    }

    async fn delete_memberships_of_group(&mut self, group_id: Uuid) -> Result<u64> {
        let before = self.work.memberships.len();
        self.work.memberships.retain(|m| m.group_id != group_id);
        Ok(removed(before, self.work.memberships.len()))
    }

    async fn delete_memberships_of_user(&mut self, user_id: Uuid) -> Result<u64> {
        let before = self.work.memberships.len();
        self.work.memberships.retain(|m| m.user_id != user_id);
        Ok(removed(before, self.work.memberships.len()))
    }

    async fn group_users(&mut self, group_id: Uuid) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .work
            .memberships
            .iter()
            .filter(|m| m.group_id == group_id)
            .filter_map(|m| self.work.users.get(&m.user_id).cloned())
            .collect();
        sort_users(&mut users);
        Ok(users)
    }

    async fn user_groups(&mut self, user_id: Uuid) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .work
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| self.work.groups.get(&m.group_id).cloned())
            .collect();
        sort_groups(&mut groups);
        Ok(groups)
    }

    async fn lock_relations(&mut self) -> Result<()> {
        // 事务已持有整个存储的锁
        Ok(())
    }

    async fn relations(&mut self) -> Result<Vec<GroupRelation>> {
        Ok(self.work.relations.clone())
    }

    async fn insert_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<GroupRelation> {
        if parent_id == child_id {
            return Err(AppError::SelfRelation(parent_id));
        }
        if self
            .work
            .relations
            .iter()
            .any(|r| r.parent_group_id == parent_id && r.child_group_id == child_id)
        {
            return Err(AppError::DuplicateRelation {
                parent_id,
                child_id,
            });
        }

        let relation = GroupRelation {
            parent_group_id: parent_id,
            child_group_id: child_id,
            created_at: Utc::now(),
        };
        self.work.relations.push(relation.clone());
        Ok(relation)
    }

    async fn delete_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<u64> {
        let before = self.work.relations.len();
        self.work
            .relations
            .retain(|r| !(r.parent_group_id == parent_id && r.child_group_id == child_id));
        Ok(removed(before, self.work.relations.len()))
    }

    async fn delete_relations_of_group(&mut self, group_id: Uuid) -> Result<u64> {
        let before = self.work.relations.len();
        self.work
            .relations
            .retain(|r| r.parent_group_id != group_id && r.child_group_id != group_id);
        Ok(removed(before, self.work.relations.len()))
    }

    async fn child_groups(&mut self, parent_id: Uuid) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .work
            .relations
            .iter()
            .filter(|r| r.parent_group_id == parent_id)
            .filter_map(|r| self.work.groups.get(&r.child_group_id).cloned())
            .collect();
        sort_groups(&mut groups);
        Ok(groups)
    }
}

#[async_trait]
impl CatalogRepository for MemoryTx {
    async fn find_service(&mut self, id: Uuid) -> Result<Option<Service>> {
        Ok(self.work.services.get(&id).cloned())
    }

    async fn find_service_by_name(&mut self, name: &str) -> Result<Option<Service>> {
        Ok(self
            .work
            .services
            .values()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn list_services(&mut self) -> Result<Vec<Service>> {
        let mut services: Vec<Service> = self.work.services.values().cloned().collect();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn insert_service(&mut self, req: &CreateServiceRequest) -> Result<Service> {
        if self.work.services.values().any(|s| s.name == req.name) {
            return Err(AppError::conflict("Service name already exists"));
        }

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name: req.name.clone(),
            description: req.description.clone(),
            enabled: req.enabled.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.work.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(
        &mut self,
        id: Uuid,
        req: &UpdateServiceRequest,
    ) -> Result<Option<Service>> {
        if let Some(name) = &req.name {
            if self
                .work
                .services
                .values()
                .any(|s| s.id != id && &s.name == name)
            {
                return Err(AppError::conflict("Service name already exists"));
            }
        }

        let Some(service) = self.work.services.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = &req.name {
            service.name = name.clone();
        }
        if req.description.is_some() {
            service.description = req.description.clone();
        }
        if let Some(enabled) = req.enabled {
            service.enabled = enabled;
        }
        service.updated_at = Utc::now();

        Ok(Some(service.clone()))
    }

    async fn delete_service(&mut self, id: Uuid) -> Result<u64> {
        Ok(self.work.services.remove(&id).map_or(0, |_| 1))
    }

    async fn find_resource(&mut self, id: Uuid) -> Result<Option<Resource>> {
        Ok(self.work.resources.get(&id).cloned())
    }

    async fn lock_resource(&mut self, id: Uuid) -> Result<Option<Resource>> {
        self.find_resource(id).await
    }

    async fn list_resources(&mut self, service_id: Uuid) -> Result<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .work
            .resources
            .values()
            .filter(|r| r.service_id == service_id)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    async fn insert_resource(&mut self, req: &CreateResourceRequest) -> Result<Resource> {
        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4(),
            service_id: req.service_id,
            name: req.name.clone(),
            description: req.description.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.resources.insert(resource.id, resource.clone());
        Ok(resource)
    }

    async fn update_resource(
        &mut self,
        id: Uuid,
        req: &UpdateResourceRequest,
    ) -> Result<Option<Resource>> {
        let Some(resource) = self.work.resources.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(service_id) = req.service_id {
            resource.service_id = service_id;
        }
        if let Some(name) = &req.name {
            resource.name = name.clone();
        }
        if req.description.is_some() {
            resource.description = req.description.clone();
        }
        resource.updated_at = Utc::now();

        Ok(Some(resource.clone()))
    }

    async fn delete_resource(&mut self, id: Uuid) -> Result<u64> {
        Ok(self.work.resources.remove(&id).map_or(0, |_| 1))
    }

    async fn delete_resources_of_service(&mut self, service_id: Uuid) -> Result<u64> {
        let before = self.work.resources.len();
        self.work.resources.retain(|_, r| r.service_id != service_id);
        Ok(removed(before, self.work.resources.len()))
    }
}

#[async_trait]
impl AccessRepository for MemoryTx {
    async fn find_access(&mut self, id: Uuid) -> Result<Option<Access>> {
        Ok(self.work.accesses.get(&id).cloned())
    }

    async fn list_access(
        &mut self,
        category: Option<&str>,
        search: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Access>> {
        let mut accesses: Vec<Access> = self
            .work
            .accesses
            .values()
            .filter(|a| category.map_or(true, |c| a.category.as_deref() == Some(c)))
            .filter(|a| search.map_or(true, |q| a.matches(q)))
            .cloned()
            .collect();
        accesses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        if let Some(limit) = limit {
            accesses.truncate(limit.max(0) as usize);
        }
        Ok(accesses)
    }

    async fn insert_access(&mut self, req: &CreateAccessRequest) -> Result<Access> {
        let now = Utc::now();
        let access = Access {
            id: Uuid::new_v4(),
            subject: req.subject(),
            access_type: req.access_type,
            name: req.name.clone(),
            category: req.category.clone(),
            created_at: now,
            updated_at: now,
        };
        self.work.accesses.insert(access.id, access.clone());
        Ok(access)
    }

    async fn delete_access(&mut self, id: Uuid) -> Result<u64> {
        Ok(self.work.accesses.remove(&id).map_or(0, |_| 1))
    }

    async fn access_ids_for_subject(&mut self, subject: Subject) -> Result<Vec<Uuid>> {
        Ok(self
            .work
            .accesses
            .values()
            .filter(|a| a.subject == subject)
            .map(|a| a.id)
            .collect())
    }

    async fn resource_access(&mut self, resource_id: Uuid) -> Result<Vec<Access>> {
        let mut accesses: Vec<Access> = self
            .work
            .links
            .iter()
            .filter(|l| l.resource_id == resource_id)
            .filter_map(|l| self.work.accesses.get(&l.access_id).cloned())
            .collect();
        accesses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(accesses)
    }

    async fn link_access(&mut self, resource_id: Uuid, access_ids: &[Uuid]) -> Result<u64> {
        let mut inserted = 0;
        for &access_id in access_ids {
            let exists = self
                .work
                .links
                .iter()
                .any(|l| l.resource_id == resource_id && l.access_id == access_id);
            if exists {
                continue;
            }
            self.work.links.push(ResourceAccess {
                resource_id,
                access_id,
                created_at: Utc::now(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn unlink(&mut self, resource_id: Uuid, access_id: Uuid) -> Result<u64> {
        let before = self.work.links.len();
        self.work
            .links
            .retain(|l| !(l.resource_id == resource_id && l.access_id == access_id));
        Ok(removed(before, self.work.links.len()))
    }

    async fn unlink_resource(&mut self, resource_id: Uuid) -> Result<u64> {
        let before = self.work.links.len();
        self.work.links.retain(|l| l.resource_id != resource_id);
        Ok(removed(before, self.work.links.len()))
    }

    async fn unlink_service(&mut self, service_id: Uuid) -> Result<u64> {
        let resources = &self.work.resources;
        let before = self.work.links.len();
        self.work.links.retain(|l| {
            resources
                .get(&l.resource_id)
                .map_or(true, |r| r.service_id != service_id)
        });
        Ok(removed(before, self.work.links.len()))
    }

    async fn unlink_access(&mut self, access_id: Uuid) -> Result<u64> {
        let before = self.work.links.len();
        self.work.links.retain(|l| l.access_id != access_id);
        Ok(removed(before, self.work.links.len()))
    }

    async fn grants_for_subjects(
        &mut self,
        user_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<Vec<GrantRow>> {
        let state = &self.work;
        let mut rows: Vec<GrantRow> = state
            .links
            .iter()
            .filter_map(|link| {
                let access = state.accesses.get(&link.access_id)?;
                let granted = match access.subject {
                    Subject::User(id) => id == user_id,
                    Subject::Group(id) => group_ids.contains(&id),
                };
                if !granted {
                    return None;
                }
                let resource = state.resources.get(&link.resource_id)?;
                let service = state.services.get(&resource.service_id)?;
                Some(GrantRow {
                    resource_name: resource.name.clone(),
                    service_name: service.name.clone(),
                    access: access.clone(),
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            (&a.resource_name, &a.service_name, &a.access.name).cmp(&(
                &b.resource_name,
                &b.service_name,
                &b.access.name,
            ))
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_request(name: &str) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            description: None,
            comment: None,
            source: None,
        }
    }

    #[tokio::test]
    async fn test_commit_persists_changes() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let group = tx.insert_group(&group_request("Engineering")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        let found = tx.find_group(group.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Engineering");
        assert_eq!(found.source, LOCAL_SOURCE);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_changes() {
        let store = MemoryStore::new();

        let id = {
            let mut tx = store.begin().await.unwrap();
            tx.insert_group(&group_request("Temp")).await.unwrap().id
        };

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_group(id).await.unwrap().is_none());

        tx.insert_group(&group_request("Other")).await.unwrap();
        tx.rollback().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.all_groups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_edges_are_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let a = tx.insert_group(&group_request("A")).await.unwrap().id;
        let b = tx.insert_group(&group_request("B")).await.unwrap().id;

        tx.insert_relation(a, b).await.unwrap();
        assert!(matches!(
            tx.insert_relation(a, b).await,
            Err(AppError::DuplicateRelation { .. })
        ));
        assert!(matches!(
            tx.insert_relation(a, a).await,
            Err(AppError::SelfRelation(_))
        ));

        let user = Uuid::new_v4();
        tx.insert_membership(a, user).await.unwrap();
        assert!(matches!(
            tx.insert_membership(a, user).await,
            Err(AppError::DuplicateMembership { .. })
        ));
    }

    #[tokio::test]
    async fn test_link_access_skips_existing() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let resource = Uuid::new_v4();
        let access = Uuid::new_v4();

        assert_eq!(tx.link_access(resource, &[access]).await.unwrap(), 1);
        assert_eq!(tx.link_access(resource, &[access]).await.unwrap(), 0);
        assert_eq!(tx.unlink(resource, access).await.unwrap(), 1);
        assert_eq!(tx.unlink(resource, access).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subject_lookup_matches_kind() {
        use crate::models::access::{AccessType, SubjectKind};

        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        // 用户与组共用同一个 ID
        let shared = Uuid::new_v4();
        let request = |user_type| CreateAccessRequest {
            user_type,
            source: shared,
            access_type: AccessType::Read,
            name: "Read".to_string(),
            category: None,
        };
        let user_access = tx.insert_access(&request(SubjectKind::User)).await.unwrap();
        let group_access = tx.insert_access(&request(SubjectKind::Group)).await.unwrap();

        assert_eq!(
            tx.access_ids_for_subject(Subject::User(shared)).await.unwrap(),
            vec![user_access.id]
        );
        assert_eq!(
            tx.access_ids_for_subject(Subject::Group(shared)).await.unwrap(),
            vec![group_access.id]
        );
    }
}
