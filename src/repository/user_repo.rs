//! User repository (数据库访问层)

use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use super::postgres::{like_pattern, map_unique, PgTx};
use super::UserRepository;
use crate::{
    error::{AppError, Result},
    models::{page::PageRequest, user::*},
};

fn user_conflict(constraint: &str) -> AppError {
    if constraint.contains("email") {
        AppError::conflict("Email already exists")
    } else {
        AppError::conflict("Login already exists")
    }
}

#[async_trait]
impl UserRepository for PgTx {
    /// 根据 ID 查找用户
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    /// 根据登录名查找用户
    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = $1")
            .bind(login)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    /// 根据邮箱查找用户（不区分大小写）
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(user)
    }

    /// 分页列出用户
    async fn list_users(&mut self, page: &PageRequest) -> Result<(Vec<User>, i64)> {
        let pattern = like_pattern(page.search.as_deref());

        let filter = r#"
            $1::text IS NULL
            OR first_name ILIKE $1
            OR last_name ILIKE $1
            OR login ILIKE $1
            OR department ILIKE $1
        "#;

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM users WHERE {}", filter))
            .bind(&pattern)
            .fetch_one(&mut *self.tx)
            .await?
            .get(0);

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT * FROM users WHERE {} ORDER BY last_name, first_name, login LIMIT $2 OFFSET $3",
            filter
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&mut *self.tx)
        .await?;

        Ok((users, total))
    }

    /// 创建用户
    async fn insert_user(&mut self, user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                login, email, password_hash, prefix, last_name, first_name,
                middle_name, suffix, department, division, comment, source
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&user.login)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.prefix)
        .bind(&user.last_name)
        .bind(&user.first_name)
        .bind(&user.middle_name)
        .bind(&user.suffix)
        .bind(&user.department)
        .bind(&user.division)
        .bind(&user.comment)
        .bind(&user.source)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, user_conflict))
    }

    /// 更新用户
    async fn update_user(&mut self, id: Uuid, req: &UpdateUserRequest) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                email = COALESCE($2, email),
                prefix = COALESCE($3, prefix),
                last_name = COALESCE($4, last_name),
                first_name = COALESCE($5, first_name),
                middle_name = COALESCE($6, middle_name),
                suffix = COALESCE($7, suffix),
                department = COALESCE($8, department),
                division = COALESCE($9, division),
                comment = COALESCE($10, comment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&req.email)
        .bind(&req.prefix)
        .bind(&req.last_name)
        .bind(&req.first_name)
        .bind(&req.middle_name)
        .bind(&req.suffix)
        .bind(&req.department)
        .bind(&req.division)
        .bind(&req.comment)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_unique(e, user_conflict))
    }

    /// 删除用户
    async fn delete_user(&mut self, id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }
}
