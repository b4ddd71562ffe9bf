//! Access repository (权限描述与资源关联)

use async_trait::async_trait;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::postgres::{like_pattern, PgTx};
use super::AccessRepository;
use crate::{
    error::Result,
    models::access::{Access, CreateAccessRequest, GrantRow, Subject},
};

#[async_trait]
impl AccessRepository for PgTx {
    async fn find_access(&mut self, id: Uuid) -> Result<Option<Access>> {
        let access = sqlx::query_as::<_, Access>("SELECT * FROM accesses WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(access)
    }

    /// 关键字匹配名称、主体 ID 与权限级别
    async fn list_access(
        &mut self,
        category: Option<&str>,
        search: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Access>> {
        let accesses = sqlx::query_as::<_, Access>(
            r#"
            SELECT * FROM accesses
            WHERE ($1::text IS NULL OR category = $1)
              AND (
                $2::text IS NULL
                OR name ILIKE $2
                OR subject_id::text ILIKE $2
                OR access_type ILIKE $2
              )
            ORDER BY name, id
            LIMIT $3
            "#,
        )
        .bind(category)
        .bind(like_pattern(search))
        .bind(limit)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(accesses)
    }

    async fn insert_access(&mut self, req: &CreateAccessRequest) -> Result<Access> {
        let subject = req.subject();

        let access = sqlx::query_as::<_, Access>(
            r#"
            INSERT INTO accesses (subject_type, subject_id, access_type, name, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(subject.kind())
        .bind(subject.id())
        .bind(req.access_type.as_str())
        .bind(&req.name)
        .bind(&req.category)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(access)
    }

    async fn delete_access(&mut self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM accesses WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn access_ids_for_subject(&mut self, subject: Subject) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM accesses WHERE subject_type = $1 AND subject_id = $2",
        )
        .bind(subject.kind())
        .bind(subject.id())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(ids)
    }

    async fn resource_access(&mut self, resource_id: Uuid) -> Result<Vec<Access>> {
        let accesses = sqlx::query_as::<_, Access>(
            r#"
            SELECT a.* FROM accesses a
            INNER JOIN resource_access ra ON ra.access_id = a.id
            WHERE ra.resource_id = $1
            ORDER BY a.name, a.id
            "#,
        )
        .bind(resource_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(accesses)
    }

    async fn link_access(&mut self, resource_id: Uuid, access_ids: &[Uuid]) -> Result<u64> {
        if access_ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO resource_access (resource_id, access_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT (resource_id, access_id) DO NOTHING
            "#,
        )
        .bind(resource_id)
        .bind(access_ids)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unlink(&mut self, resource_id: Uuid, access_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM resource_access WHERE resource_id = $1 AND access_id = $2")
                .bind(resource_id)
                .bind(access_id)
                .execute(&mut *self.tx)
                .await?;

        Ok(result.rows_affected())
    }

    async fn unlink_resource(&mut self, resource_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resource_access WHERE resource_id = $1")
            .bind(resource_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn unlink_service(&mut self, service_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM resource_access
            WHERE resource_id IN (SELECT id FROM resources WHERE service_id = $1)
            "#,
        )
        .bind(service_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn unlink_access(&mut self, access_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM resource_access WHERE access_id = $1")
            .bind(access_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    /// 单次联表查询：资源关联 -> 权限 -> 资源 -> 服务
    async fn grants_for_subjects(
        &mut self,
        user_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<Vec<GrantRow>> {
        let rows = sqlx::query(
            r#"
            SELECT r.name AS resource_name, s.name AS service_name, a.*
            FROM resource_access ra
            INNER JOIN accesses a ON a.id = ra.access_id
            INNER JOIN resources r ON r.id = ra.resource_id
            INNER JOIN services s ON s.id = r.service_id
            WHERE (a.subject_type = 'USER' AND a.subject_id = $1)
               OR (a.subject_type = 'GROUP' AND a.subject_id = ANY($2))
            ORDER BY r.name, s.name, a.name
            "#,
        )
        .bind(user_id)
        .bind(group_ids)
        .fetch_all(&mut *self.tx)
        .await?;

        let grants = rows
            .iter()
            .map(|row| {
                Ok(GrantRow {
                    resource_name: row.try_get("resource_name")?,
                    service_name: row.try_get("service_name")?,
                    access: Access::from_row(row)?,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        Ok(grants)
    }
}
