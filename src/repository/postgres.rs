//! PostgreSQL 存储后端
//!
//! 每个实体的查询实现分布在 `user_repo` / `group_repo` / `catalog_repo` / `access_repo` 中。

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::{Store, Transaction};
use crate::error::{AppError, Result};

/// 组关系图的事务级咨询锁键
const GROUP_GRAPH_LOCK_KEY: i64 = 0x6772_6f75_7073;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    type Tx = PgTx;

    async fn begin(&self) -> Result<PgTx> {
        let tx = self.pool.begin().await?;
        Ok(PgTx { tx })
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// 数据库事务；drop 时未提交则自动回滚
pub struct PgTx {
    pub(super) tx: sqlx::Transaction<'static, Postgres>,
}

impl PgTx {
    /// 获取组关系图的排他锁
    pub(super) async fn lock_group_graph(&mut self) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(GROUP_GRAPH_LOCK_KEY)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Transaction for PgTx {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// 构造 ILIKE 子串模式，转义通配符
pub(super) fn like_pattern(search: Option<&str>) -> Option<String> {
    search.map(|s| {
        let escaped = s
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

/// 唯一约束冲突时返回约束名
pub(super) fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Some(db.constraint().unwrap_or_default().to_string())
        }
        _ => None,
    }
}

/// 唯一约束冲突映射为业务错误，其余错误原样转换
pub(super) fn map_unique<F>(err: sqlx::Error, on_conflict: F) -> AppError
where
    F: FnOnce(&str) -> AppError,
{
    match unique_violation(&err) {
        Some(constraint) => on_conflict(&constraint),
        None => AppError::Database(err),
    }
}
