//! Group repository (组、成员关系与嵌套关系)

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use super::postgres::{like_pattern, map_unique, PgTx};
use super::GroupRepository;
use crate::{
    error::{AppError, Result},
    models::{group::*, page::PageRequest, user::*},
};

/// 名称或描述的子串匹配
const GROUP_FILTER: &str = "($1::text IS NULL OR name ILIKE $1 OR description ILIKE $1)";

#[async_trait]
impl GroupRepository for PgTx {
    // ==================== Groups ====================

    async fn find_group(&mut self, id: Uuid) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(group)
    }

    async fn list_groups(&mut self, page: &PageRequest) -> Result<(Vec<Group>, i64)> {
        let pattern = like_pattern(page.search.as_deref());

        let total: i64 =
            sqlx::query(&format!("SELECT COUNT(*) FROM groups WHERE {}", GROUP_FILTER))
                .bind(&pattern)
                .fetch_one(&mut *self.tx)
                .await?
                .get(0);

        let groups = sqlx::query_as::<_, Group>(&format!(
            r#"
            SELECT * FROM groups
            WHERE {}
            ORDER BY name, id
            LIMIT $2 OFFSET $3
            "#,
            GROUP_FILTER
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok((groups, total))
    }

    async fn all_groups(&mut self) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>("SELECT * FROM groups ORDER BY name, id")
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(groups)
    }

    async fn insert_group(&mut self, req: &CreateGroupRequest) -> Result<Group> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, comment, source)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.comment)
        .bind(req.source.as_deref().unwrap_or(LOCAL_SOURCE))
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(group)
    }

    async fn update_group(&mut self, id: Uuid, req: &UpdateGroupRequest) -> Result<Option<Group>> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                comment = COALESCE($4, comment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.name)
        .bind(&req.description)
        .bind(&req.comment)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(group)
    }

    async fn delete_group(&mut self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    // ==================== Memberships ====================

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>> {
        let membership = sqlx::query_as::<_, GroupMembership>(
            "SELECT * FROM group_users WHERE group_id = $1 AND user_id = $2",
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(membership)
    }

    async fn insert_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<GroupMembership> {
        sqlx::query_as::<_, GroupMembership>(
            r#"
            INSERT INTO group_users (group_id, user_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, |_| AppError::DuplicateMembership { group_id, user_id }))
    }

    async fn delete_membership(&mut self, group_id: Uuid, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM group_users WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_memberships_of_group(&mut self, group_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM group_users WHERE group_id = $1")
            .bind(group_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_memberships_of_user(&mut self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM group_users WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn group_users(&mut self, group_id: Uuid) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            INNER JOIN group_users gu ON gu.user_id = u.id
            WHERE gu.group_id = $1
            ORDER BY u.last_name, u.first_name, u.login
            "#,
        )
        .bind(group_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(users)
    }

    async fn user_groups(&mut self, user_id: Uuid) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.* FROM groups g
            INNER JOIN group_users gu ON gu.group_id = g.id
            WHERE gu.user_id = $1
            ORDER BY g.name, g.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(groups)
    }

    // ==================== Relations ====================

    async fn lock_relations(&mut self) -> Result<()> {
        self.lock_group_graph().await
    }

    async fn relations(&mut self) -> Result<Vec<GroupRelation>> {
        let relations = sqlx::query_as::<_, GroupRelation>("SELECT * FROM group_relations")
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(relations)
    }

    async fn insert_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<GroupRelation> {
        if parent_id == child_id {
            return Err(AppError::SelfRelation(parent_id));
        }

        sqlx::query_as::<_, GroupRelation>(
            r#"
            INSERT INTO group_relations (parent_group_id, child_group_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(parent_id)
        .bind(child_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_unique(e, |_| AppError::DuplicateRelation {
                parent_id,
                child_id,
            })
        })
    }

    async fn delete_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM group_relations WHERE parent_group_id = $1 AND child_group_id = $2",
        )
        .bind(parent_id)
        .bind(child_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_relations_of_group(&mut self, group_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM group_relations WHERE parent_group_id = $1 OR child_group_id = $1",
        )
        .bind(group_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn child_groups(&mut self, parent_id: Uuid) -> Result<Vec<Group>> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.* FROM groups g
            INNER JOIN group_relations gr ON gr.child_group_id = g.id
            WHERE gr.parent_group_id = $1
            ORDER BY g.name, g.id
            "#,
        )
        .bind(parent_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(groups)
    }
}
