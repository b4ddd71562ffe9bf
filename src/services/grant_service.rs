//! 授权管理服务
//! 维护资源与权限描述之间的关联，以及权限描述本身的创建与删除

use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Entity, Result},
    models::access::{Access, CreateAccessRequest, SaveAccessOutcome, Subject},
    repository::{
        AccessRepository, CatalogRepository, GroupRepository, Store, Transaction, UserRepository,
    },
};

pub struct GrantService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> GrantService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// 用给定集合整体替换资源上的权限关联
    ///
    /// 资源与每个权限 ID 都在删除旧关联之前校验；重复 ID 只关联一次。
    pub async fn save_access(
        &self,
        resource_id: Uuid,
        access_ids: Vec<Uuid>,
    ) -> Result<SaveAccessOutcome> {
        let mut seen = HashSet::new();
        let access_ids: Vec<Uuid> = access_ids.into_iter().filter(|id| seen.insert(*id)).collect();

        let mut tx = self.store.begin().await?;

        if tx.lock_resource(resource_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Resource, resource_id));
        }

        for access_id in &access_ids {
            if tx.find_access(*access_id).await?.is_none() {
                return Err(AppError::not_found(Entity::Access, *access_id));
            }
        }

        let unlinked = tx.unlink_resource(resource_id).await?;
        let linked = tx.link_access(resource_id, &access_ids).await?;
        tx.commit().await?;

        tracing::info!(
            resource_id = %resource_id,
            unlinked,
            linked,
            "Resource access saved"
        );

        Ok(SaveAccessOutcome {
            success: true,
            linked: linked as usize,
        })
    }

    /// 移除权限的全部资源关联，`delete_record` 为真时一并删除权限描述
    pub async fn remove_access_grant(&self, access_id: Uuid, delete_record: bool) -> Result<u64> {
        let mut tx = self.store.begin().await?;

        if tx.find_access(access_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Access, access_id));
        }

        let unlinked = tx.unlink_access(access_id).await?;
        if delete_record {
            tx.delete_access(access_id).await?;
        }
        tx.commit().await?;

        tracing::info!(
            access_id = %access_id,
            unlinked,
            deleted = delete_record,
            "Access grant removed"
        );
        Ok(unlinked)
    }

    /// 移除单条资源关联；不存在时返回 0
    pub async fn unlink_access(&self, resource_id: Uuid, access_id: Uuid) -> Result<u64> {
        let mut tx = self.store.begin().await?;
        let removed = tx.unlink(resource_id, access_id).await?;
        tx.commit().await?;

        if removed > 0 {
            tracing::info!(resource_id = %resource_id, access_id = %access_id, "Access unlinked");
        }
        Ok(removed)
    }

    /// 创建权限描述；主体必须存在
    pub async fn create_access(&self, req: CreateAccessRequest) -> Result<Access> {
        req.validate()?;
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Access name must not be empty"));
        }

        let mut tx = self.store.begin().await?;

        match req.subject() {
            Subject::User(id) => {
                if tx.find_user(id).await?.is_none() {
                    return Err(AppError::not_found(Entity::User, id));
                }
            }
            Subject::Group(id) => {
                if tx.find_group(id).await?.is_none() {
                    return Err(AppError::not_found(Entity::Group, id));
                }
            }
        }

        let access = tx.insert_access(&req).await?;
        tx.commit().await?;

        tracing::info!(
            access_id = %access.id,
            subject = %access.subject.kind(),
            subject_id = %access.subject.id(),
            access_type = %access.access_type,
            "Access created"
        );
        Ok(access)
    }
}
