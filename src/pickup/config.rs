use std::time::Duration;

/// 默认 mock 存储地址
pub const DEFAULT_API_BASE_URL: &str = "https://6868edb5d5933161d70ce3e4.mockapi.io/axios";

/// 原型阶段所有新建取件都分配给这个骑手
pub const DEFAULT_PARTNER_PHONE: &str = "9391234123";

/// 占位 OTP（不是安全机制）
pub const DEFAULT_OTP_CODE: &str = "123456";

/// 客户端类型，决定本地会话库和默认视角
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Customer,
    Partner,
}

impl AppKind {
    pub fn default_db_url(self) -> &'static str {
        match self {
            AppKind::Customer => "sqlite://tesukupo-customer.db?mode=rwc",
            AppKind::Partner => "sqlite://tesukupo-partner.db?mode=rwc",
        }
    }
}

/// 客户端配置
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// 客户端类型
    pub app: AppKind,
    /// mock REST 存储基础地址（不含 `/pickups`）
    pub api_base_url: String,
    /// 本地会话 SQLite 数据库 URL
    ///
    /// 例如：`sqlite://tesukupo-customer.db?mode=rwc`
    pub db_url: String,
    /// 新建取件时写入的骑手手机号
    pub partner_phone: String,
    /// 登录时比对的 OTP
    pub otp_code: String,
    /// HTTP 请求超时，None 表示使用 reqwest 默认值
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// 创建默认配置
    pub fn new(app: AppKind) -> Self {
        Self {
            app,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            db_url: app.default_db_url().to_string(),
            partner_phone: DEFAULT_PARTNER_PHONE.to_string(),
            otp_code: DEFAULT_OTP_CODE.to_string(),
            request_timeout: None,
        }
    }
}
