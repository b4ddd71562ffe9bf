//! 数据模型模块
//! 用户、组、服务与资源、权限授予，以及分页辅助类型

pub mod access;
pub mod catalog;
pub mod group;
pub mod page;
pub mod user;
