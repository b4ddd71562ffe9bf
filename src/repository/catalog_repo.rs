//! Catalog repository (服务与资源)

use async_trait::async_trait;
use uuid::Uuid;

use super::postgres::{map_unique, PgTx};
use super::CatalogRepository;
use crate::{
    error::{AppError, Result},
    models::catalog::*,
};

fn service_conflict(_: &str) -> AppError {
    AppError::conflict("Service name already exists")
}

#[async_trait]
impl CatalogRepository for PgTx {
    // ==================== Services ====================

    async fn find_service(&mut self, id: Uuid) -> Result<Option<Service>> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(service)
    }

    async fn find_service_by_name(&mut self, name: &str) -> Result<Option<Service>> {
        let service = sqlx::query_as::<_, Service>("SELECT * FROM services WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(service)
    }

    async fn list_services(&mut self) -> Result<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(services)
    }

    async fn insert_service(&mut self, req: &CreateServiceRequest) -> Result<Service> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, description, enabled)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.enabled.unwrap_or(true))
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, service_conflict))
    }

    async fn update_service(
        &mut self,
        id: Uuid,
        req: &UpdateServiceRequest,
    ) -> Result<Option<Service>> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                enabled = COALESCE($4, enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.enabled)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, service_conflict))
    }

    async fn delete_service(&mut self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    // ==================== Resources ====================

    async fn find_resource(&mut self, id: Uuid) -> Result<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(resource)
    }

    async fn lock_resource(&mut self, id: Uuid) -> Result<Option<Resource>> {
        let resource =
            sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?;

        Ok(resource)
    }

    async fn list_resources(&mut self, service_id: Uuid) -> Result<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE service_id = $1 ORDER BY name",
        )
        .bind(service_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(resources)
    }

    async fn insert_resource(&mut self, req: &CreateResourceRequest) -> Result<Resource> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            INSERT INTO resources (service_id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(req.service_id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(resource)
    }

    async fn update_resource(
        &mut self,
        id: Uuid,
        req: &UpdateResourceRequest,
    ) -> Result<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>(
            r#"
            UPDATE resources
            SET
                service_id = COALESCE($2, service_id),
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(req.service_id)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(resource)
    }

    async fn delete_resource(&mut self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_resources_of_service(&mut self, service_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resources WHERE service_id = $1")
            .bind(service_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}
