//! 服务与资源目录

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Entity, Result},
    models::catalog::*,
    repository::{AccessRepository, CatalogRepository, Store, Transaction},
};

pub struct CatalogService<S: Store> {
    store: Arc<S>,
}

impl<S: Store> CatalogService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    // ==================== Services ====================

    /// 列出全部服务及其资源
    pub async fn list_services(&self) -> Result<Vec<ServiceWithResources>> {
        let mut tx = self.store.begin().await?;
        let services = tx.list_services().await?;

        let mut result = Vec::with_capacity(services.len());
        for service in services {
            let resources = tx.list_resources(service.id).await?;
            result.push(ServiceWithResources { service, resources });
        }

        Ok(result)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<ServiceWithResources> {
        let mut tx = self.store.begin().await?;
        let service = tx
            .find_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Service, service_id))?;
        let resources = tx.list_resources(service_id).await?;

        Ok(ServiceWithResources { service, resources })
    }

    pub async fn find_service_by_name(&self, name: &str) -> Result<Option<Service>> {
        let mut tx = self.store.begin().await?;
        tx.find_service_by_name(name).await
    }

    pub async fn create_service(&self, req: CreateServiceRequest) -> Result<Service> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        if tx.find_service_by_name(&req.name).await?.is_some() {
            return Err(AppError::conflict("Service name already exists"));
        }

        let service = tx.insert_service(&req).await?;
        tx.commit().await?;

        tracing::info!(service_id = %service.id, name = %service.name, "Service created");
        Ok(service)
    }

    pub async fn update_service(
        &self,
        service_id: Uuid,
        req: UpdateServiceRequest,
    ) -> Result<Service> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        let service = tx
            .update_service(service_id, &req)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Service, service_id))?;
        tx.commit().await?;

        tracing::info!(service_id = %service_id, "Service updated");
        Ok(service)
    }

    /// 切换服务启用状态
    pub async fn toggle_service(&self, service_id: Uuid) -> Result<Service> {
        let mut tx = self.store.begin().await?;
        let current = tx
            .find_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Service, service_id))?;

        let update = UpdateServiceRequest {
            enabled: Some(!current.enabled),
            ..Default::default()
        };
        let service = tx
            .update_service(service_id, &update)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Service, service_id))?;
        tx.commit().await?;

        tracing::info!(service_id = %service_id, enabled = service.enabled, "Service toggled");
        Ok(service)
    }

    /// 级联删除服务：资源关联、资源、服务
    pub async fn delete_service(&self, service_id: Uuid) -> Result<()> {
        let mut tx = self.store.begin().await?;

        if tx.find_service(service_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Service, service_id));
        }

        let links = tx.unlink_service(service_id).await?;
        let resources = tx.delete_resources_of_service(service_id).await?;
        tx.delete_service(service_id).await?;
        tx.commit().await?;

        tracing::info!(service_id = %service_id, links, resources, "Service deleted");
        Ok(())
    }

    // ==================== Resources ====================

    pub async fn list_resources(&self, service_id: Uuid) -> Result<Vec<Resource>> {
        let mut tx = self.store.begin().await?;
        if tx.find_service(service_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Service, service_id));
        }
        tx.list_resources(service_id).await
    }

    pub async fn get_resource(&self, resource_id: Uuid) -> Result<Resource> {
        let mut tx = self.store.begin().await?;
        tx.find_resource(resource_id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Resource, resource_id))
    }

    pub async fn create_resource(&self, req: CreateResourceRequest) -> Result<Resource> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        if tx.find_service(req.service_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Service, req.service_id));
        }

        let resource = tx.insert_resource(&req).await?;
        tx.commit().await?;

        tracing::info!(
            resource_id = %resource.id,
            service_id = %resource.service_id,
            "Resource created"
        );
        Ok(resource)
    }

    pub async fn update_resource(
        &self,
        resource_id: Uuid,
        req: UpdateResourceRequest,
    ) -> Result<Resource> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        if let Some(service_id) = req.service_id {
            if tx.find_service(service_id).await?.is_none() {
                return Err(AppError::not_found(Entity::Service, service_id));
            }
        }

        let resource = tx
            .update_resource(resource_id, &req)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::Resource, resource_id))?;
        tx.commit().await?;

        tracing::info!(resource_id = %resource_id, "Resource updated");
        Ok(resource)
    }

    /// 删除资源及其权限关联
    pub async fn delete_resource(&self, resource_id: Uuid) -> Result<()> {
        let mut tx = self.store.begin().await?;

        if tx.lock_resource(resource_id).await?.is_none() {
            return Err(AppError::not_found(Entity::Resource, resource_id));
        }

        let links = tx.unlink_resource(resource_id).await?;
        tx.delete_resource(resource_id).await?;
        tx.commit().await?;

        tracing::info!(resource_id = %resource_id, links, "Resource deleted");
        Ok(())
    }
}
