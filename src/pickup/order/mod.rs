//! 取件记录模块
//!
//! 远端存储访问、生命周期状态机与本地筛选

pub mod api;
pub mod lifecycle;
pub mod listener;
pub mod models;
pub mod query;
pub mod store;

// 重新导出主要类型和函数
pub use api::PickupApi;
pub use lifecycle::{next_action, NextAction, ValidatedItems};
pub use listener::{EmptyPickupListener, PickupListener};
pub use models::{NewPickup, Pickup, PickupItem, PickupStatus, PickupUpdate};
pub use query::{PickupFilter, StatusFilter, DASHBOARD_RECENT_LIMIT};
pub use store::{MemoryPickupStore, PickupStore};
