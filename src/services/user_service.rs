//! 用户管理服务

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::PasswordHasher,
    config::SecurityConfig,
    error::{AppError, Entity, Result},
    models::{
        access::Subject,
        page::{Page, PageRequest},
        user::*,
    },
    repository::{AccessRepository, GroupRepository, Store, Transaction, UserRepository},
};

pub struct UserService<S: Store> {
    store: Arc<S>,
    hasher: PasswordHasher,
    policy: SecurityConfig,
}

impl<S: Store> UserService<S> {
    pub fn new(store: Arc<S>, hasher: PasswordHasher, policy: SecurityConfig) -> Self {
        Self {
            store,
            hasher,
            policy,
        }
    }

    /// 分页列出用户
    pub async fn list_users(&self, page: &PageRequest) -> Result<Page<User>> {
        let mut tx = self.store.begin().await?;
        let (users, total) = tx.list_users(page).await?;
        Ok(Page::new(users, total, page))
    }

    /// 获取用户及其直接所属的组
    pub async fn get_user(&self, user_id: Uuid) -> Result<UserWithGroups> {
        let mut tx = self.store.begin().await?;
        let user = tx
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::User, user_id))?;
        let groups = tx.user_groups(user_id).await?;

        Ok(UserWithGroups { user, groups })
    }

    /// 创建用户
    pub async fn create_user(&self, req: CreateUserRequest) -> Result<User> {
        req.validate()?;
        PasswordHasher::validate_password_policy(&req.password, &self.policy)?;

        // 哈希在开启事务之前完成
        let password_hash = self.hasher.hash(&req.password)?;

        let mut tx = self.store.begin().await?;

        if tx.find_user_by_login(&req.login).await?.is_some() {
            return Err(AppError::conflict("Login already exists"));
        }
        if tx.find_user_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("Email already exists"));
        }

        let user = tx
            .insert_user(&NewUser::from_request(req, password_hash))
            .await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, login = %user.login, "User created");
        Ok(user)
    }

    /// 更新用户
    pub async fn update_user(&self, user_id: Uuid, req: UpdateUserRequest) -> Result<User> {
        req.validate()?;

        let mut tx = self.store.begin().await?;
        let user = tx
            .update_user(user_id, &req)
            .await?
            .ok_or_else(|| AppError::not_found(Entity::User, user_id))?;
        tx.commit().await?;

        tracing::info!(user_id = %user_id, "User updated");
        Ok(user)
    }

    /// 级联删除用户：成员关系、以该用户为主体的权限及其资源关联
    pub async fn delete_user(&self, user_id: Uuid) -> Result<()> {
        let mut tx = self.store.begin().await?;

        if tx.find_user(user_id).await?.is_none() {
            return Err(AppError::not_found(Entity::User, user_id));
        }

        let memberships = tx.delete_memberships_of_user(user_id).await?;
        let access_ids = tx.access_ids_for_subject(Subject::User(user_id)).await?;
        for access_id in &access_ids {
            tx.unlink_access(*access_id).await?;
            tx.delete_access(*access_id).await?;
        }
        tx.delete_user(user_id).await?;
        tx.commit().await?;

        tracing::info!(
            user_id = %user_id,
            memberships,
            accesses = access_ids.len(),
            "User deleted"
        );
        Ok(())
    }
}
