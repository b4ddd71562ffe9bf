//! Principal store: repository traits and their backends
//!
//! 所有读写都在显式事务中进行：`Store::begin` 开启，`Transaction::commit` 提交，
//! 未提交即被 drop 的事务视为回滚。

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::{
        access::{Access, CreateAccessRequest, GrantRow, Subject},
        catalog::*,
        group::*,
        page::PageRequest,
        user::*,
    },
};

pub mod access_repo;
pub mod catalog_repo;
pub mod group_repo;
pub mod memory;
pub mod postgres;
pub mod user_repo;

pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgStore, PgTx};

/// 存储入口
#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Tx: Transaction;

    /// 开启事务
    async fn begin(&self) -> Result<Self::Tx>;

    /// 存储健康检查
    async fn ping(&self) -> Result<()>;
}

/// 事务：聚合全部仓库能力
#[async_trait]
pub trait Transaction:
    UserRepository + GroupRepository + CatalogRepository + AccessRepository + Send + Sized
{
    async fn commit(self) -> Result<()>;

    async fn rollback(self) -> Result<()>;
}

#[async_trait]
pub trait UserRepository {
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>>;

    async fn find_user_by_login(&mut self, login: &str) -> Result<Option<User>>;

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// 分页列出用户（按姓氏排序），返回 (当前页, 总数)
    async fn list_users(&mut self, page: &PageRequest) -> Result<(Vec<User>, i64)>;

    async fn insert_user(&mut self, user: &NewUser) -> Result<User>;

    async fn update_user(&mut self, id: Uuid, req: &UpdateUserRequest) -> Result<Option<User>>;

    async fn delete_user(&mut self, id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait GroupRepository {
    // ==================== Groups ====================

    async fn find_group(&mut self, id: Uuid) -> Result<Option<Group>>;

    /// 分页列出组（按名称排序），返回 (当前页, 总数)
    async fn list_groups(&mut self, page: &PageRequest) -> Result<(Vec<Group>, i64)>;

    /// 全部组（按名称排序）
    async fn all_groups(&mut self) -> Result<Vec<Group>>;

    async fn insert_group(&mut self, req: &CreateGroupRequest) -> Result<Group>;

    async fn update_group(&mut self, id: Uuid, req: &UpdateGroupRequest) -> Result<Option<Group>>;

    async fn delete_group(&mut self, id: Uuid) -> Result<u64>;

    // ==================== Memberships ====================

    async fn find_membership(
        &mut self,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMembership>>;

    async fn insert_membership(&mut self, group_id: Uuid, user_id: Uuid)
        -> Result<GroupMembership>;

    async fn delete_membership(&mut self, group_id: Uuid, user_id: Uuid) -> Result<u64>;

    async fn delete_memberships_of_group(&mut self, group_id: Uuid) -> Result<u64>;

    async fn delete_memberships_of_user(&mut self, user_id: Uuid) -> Result<u64>;

    /// 组的直接成员用户（按姓名排序）
    async fn group_users(&mut self, group_id: Uuid) -> Result<Vec<User>>;

    /// 用户直接所属的组（按名称排序）
    async fn user_groups(&mut self, user_id: Uuid) -> Result<Vec<Group>>;

    // ==================== Relations ====================

    /// 获取组关系图的排他锁，直到事务结束
    async fn lock_relations(&mut self) -> Result<()>;

    /// 全部嵌套关系边
    async fn relations(&mut self) -> Result<Vec<GroupRelation>>;

    async fn insert_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<GroupRelation>;

    async fn delete_relation(&mut self, parent_id: Uuid, child_id: Uuid) -> Result<u64>;

    /// 删除该组作为父或子的所有关系
    async fn delete_relations_of_group(&mut self, group_id: Uuid) -> Result<u64>;

    /// 直接子组（按名称排序）
    async fn child_groups(&mut self, parent_id: Uuid) -> Result<Vec<Group>>;
}

#[async_trait]
pub trait CatalogRepository {
    // ==================== Services ====================

    async fn find_service(&mut self, id: Uuid) -> Result<Option<Service>>;

    async fn find_service_by_name(&mut self, name: &str) -> Result<Option<Service>>;

    async fn list_services(&mut self) -> Result<Vec<Service>>;

    async fn insert_service(&mut self, req: &CreateServiceRequest) -> Result<Service>;

    async fn update_service(
        &mut self,
        id: Uuid,
        req: &UpdateServiceRequest,
    ) -> Result<Option<Service>>;

    async fn delete_service(&mut self, id: Uuid) -> Result<u64>;

    // ==================== Resources ====================

    async fn find_resource(&mut self, id: Uuid) -> Result<Option<Resource>>;

    /// 查找并锁定资源行，直到事务结束
    async fn lock_resource(&mut self, id: Uuid) -> Result<Option<Resource>>;

    async fn list_resources(&mut self, service_id: Uuid) -> Result<Vec<Resource>>;

    async fn insert_resource(&mut self, req: &CreateResourceRequest) -> Result<Resource>;

    async fn update_resource(
        &mut self,
        id: Uuid,
        req: &UpdateResourceRequest,
    ) -> Result<Option<Resource>>;

    async fn delete_resource(&mut self, id: Uuid) -> Result<u64>;

    async fn delete_resources_of_service(&mut self, service_id: Uuid) -> Result<u64>;
}

#[async_trait]
pub trait AccessRepository {
    async fn find_access(&mut self, id: Uuid) -> Result<Option<Access>>;

    /// 按分类与关键字过滤（不区分大小写），按名称排序
    async fn list_access(
        &mut self,
        category: Option<&str>,
        search: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<Access>>;

    async fn insert_access(&mut self, req: &CreateAccessRequest) -> Result<Access>;

    async fn delete_access(&mut self, id: Uuid) -> Result<u64>;

    /// 以该主体为授予对象的权限 ID
    async fn access_ids_for_subject(&mut self, subject: Subject) -> Result<Vec<Uuid>>;

    /// 资源上已关联的权限（按名称排序）
    async fn resource_access(&mut self, resource_id: Uuid) -> Result<Vec<Access>>;

    /// 批量关联，已存在的关联跳过；返回新插入条数
    async fn link_access(&mut self, resource_id: Uuid, access_ids: &[Uuid]) -> Result<u64>;

    async fn unlink(&mut self, resource_id: Uuid, access_id: Uuid) -> Result<u64>;

    async fn unlink_resource(&mut self, resource_id: Uuid) -> Result<u64>;

    async fn unlink_service(&mut self, service_id: Uuid) -> Result<u64>;

    async fn unlink_access(&mut self, access_id: Uuid) -> Result<u64>;

    /// 授予给该用户本人或给定组的已关联权限，按资源名、服务名、权限名排序
    async fn grants_for_subjects(
        &mut self,
        user_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<Vec<GrantRow>>;
}
