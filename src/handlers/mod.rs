//! HTTP 处理器模块

use serde::Deserialize;

pub mod access;
pub mod group;
pub mod health;
pub mod resource;
pub mod service;
pub mod user;

/// 单个关键字过滤
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}
