//! 权限解析服务
//! 计算用户的有效权限，以及按资源、服务反查已关联的权限

use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AccessConfig,
    error::{AppError, Entity, Result},
    graph::GroupGraph,
    models::{
        access::{category_label, Access, AccessFilter, EffectiveAccess},
        catalog::ResourceGrants,
        page::normalize_search,
    },
    repository::{AccessRepository, CatalogRepository, GroupRepository, Store, UserRepository},
};

pub struct AccessService<S: Store> {
    store: Arc<S>,
    config: AccessConfig,
}

impl<S: Store> AccessService<S> {
    pub fn new(store: Arc<S>, config: AccessConfig) -> Self {
        Self { store, config }
    }

    /// 用户的有效权限：直接授予本人的权限加上通过所属组获得的权限
    pub async fn effective_access(&self, user_id: Uuid) -> Result<Vec<EffectiveAccess>> {
        let mut tx = self.store.begin().await?;

        if tx.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found(Entity::User, user_id));
        }

        let mut group_ids: BTreeSet<Uuid> = tx
            .user_groups(user_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        if self.config.transitive_groups && !group_ids.is_empty() {
            let graph = GroupGraph::from_relations(&tx.relations().await?);
            let ancestors: Vec<Uuid> = group_ids
                .iter()
                .flat_map(|id| graph.ancestors(*id))
                .collect();
            group_ids.extend(ancestors);
        }

        let group_ids: Vec<Uuid> = group_ids.into_iter().collect();
        let rows = tx.grants_for_subjects(user_id, &group_ids).await?;

        tracing::debug!(
            user_id = %user_id,
            groups = group_ids.len(),
            grants = rows.len(),
            "Resolved effective access"
        );

        Ok(rows.into_iter().map(EffectiveAccess::from).collect())
    }

    /// 资源上已关联的全部权限
    pub async fn access_for_resource(&self, resource_id: Uuid) -> Result<Vec<Access>> {
        let mut tx = self.store.begin().await?;

        if tx.find_resource(resource_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Resource, resource_id));
        }

        tx.resource_access(resource_id).await
    }

    /// 管理列表：按分类与关键字过滤
    pub async fn access_list(&self, filter: AccessFilter) -> Result<Vec<Access>> {
        let category = normalize_search(filter.filter_type).map(|t| category_label(&t));
        let search = normalize_search(filter.search);
        let limit = filter.limit.filter(|l| *l > 0);

        let mut tx = self.store.begin().await?;
        tx.list_access(category.as_deref(), search.as_deref(), limit)
            .await
    }

    /// 联想搜索，条数受 `search_limit` 限制
    pub async fn search_access(&self, query: Option<String>) -> Result<Vec<Access>> {
        let search = normalize_search(query);

        let mut tx = self.store.begin().await?;
        tx.list_access(None, search.as_deref(), Some(self.config.search_limit))
            .await
    }

    pub async fn get_access(&self, access_id: Uuid) -> Result<Access> {
        let mut tx = self.store.begin().await?;
        tx.find_access(access_id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Access, access_id))
    }

    /// 服务下每个资源及其关联的权限
    pub async fn service_access(&self, service_id: Uuid) -> Result<Vec<ResourceGrants>> {
        let mut tx = self.store.begin().await?;

        if tx.find_service(service_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Service, service_id));
        }

        let resources = tx.list_resources(service_id).await?;
        let mut grants = Vec::with_capacity(resources.len());
        for resource in resources {
            let access = tx.resource_access(resource.id).await?;
            grants.push(ResourceGrants { resource, access });
        }

        Ok(grants)
    }
}
