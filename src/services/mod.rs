//! Business logic services layer

pub mod access_service;
pub mod catalog_service;
pub mod grant_service;
pub mod group_service;
pub mod user_service;

pub use access_service::AccessService;
pub use catalog_service::CatalogService;
pub use grant_service::GrantService;
pub use group_service::GroupService;
pub use user_service::UserService;
