//! 访问管理控制台
//! 用户、组嵌套关系、服务资源与授权的管理与有效权限解析

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod graph;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
