//! 本地会话模块
//!
//! 保存登录身份（userPhone / userName），启动时据此决定初始页面

pub mod dao;
pub mod models;
pub mod service;

// 重新导出主要类型和函数
pub use dao::SessionDao;
pub use models::{InitialRoute, Session};
pub use service::SessionManager;
