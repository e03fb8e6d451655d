//! 本地会话模型定义

use serde::{Deserialize, Serialize};

/// 会话键：手机号
pub const KEY_USER_PHONE: &str = "userPhone";

/// 会话键：姓名
pub const KEY_USER_NAME: &str = "userName";

/// 已登录用户身份，作为所有列表查询的过滤键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userPhone")]
    pub user_phone: String,
}

/// 启动时的初始页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialRoute {
    /// 已登录，进入首页
    Dashboard,
    /// 未登录，进入引导 / 登录流程
    GetStarted,
}
