//! 会话服务层
//!
//! 登录成功后把身份写入本地存储；启动时读取会话决定初始页面。

use crate::pickup::auth::{validate_login, OtpChallenge};
use crate::pickup::db::create_sqlite_pool_with_migration;
use crate::pickup::error::PickupError;
use crate::pickup::session::dao::SessionDao;
use crate::pickup::session::models::{InitialRoute, Session, KEY_USER_NAME, KEY_USER_PHONE};
use anyhow::Result;
use sqlx::{Pool, Sqlite};
use tracing::{error, info};

/// 会话管理器
#[derive(Clone)]
pub struct SessionManager {
    dao: SessionDao,
    otp_code: String,
}

impl SessionManager {
    /// 连接本地数据库并创建会话管理器
    pub async fn connect(db_url: &str, otp_code: impl Into<String>) -> Result<Self> {
        let db = create_sqlite_pool_with_migration(db_url).await?;
        info!("[Session] 本地会话库已连接: {}", db_url);
        Ok(Self::with_db(db, otp_code))
    }

    /// 使用已有连接池创建
    pub fn with_db(db: Pool<Sqlite>, otp_code: impl Into<String>) -> Self {
        Self {
            dao: SessionDao::new(db),
            otp_code: otp_code.into(),
        }
    }

    /// 读取已保存的会话，两项都存在才视为已登录
    pub async fn load(&self) -> Result<Option<Session>> {
        let phone = self.dao.get_item(KEY_USER_PHONE).await?;
        let name = self.dao.get_item(KEY_USER_NAME).await?;
        Ok(match (phone, name) {
            (Some(user_phone), Some(user_name)) if !user_phone.is_empty() && !user_name.is_empty() => {
                Some(Session {
                    user_name,
                    user_phone,
                })
            }
            _ => None,
        })
    }

    /// 启动时恢复会话，读取失败按未登录处理
    pub async fn restore(&self) -> Option<Session> {
        match self.load().await {
            Ok(session) => session,
            Err(e) => {
                error!("[Session] 读取会话失败: {:?}", e);
                None
            }
        }
    }

    /// 根据会话决定初始页面
    pub async fn initial_route(&self) -> InitialRoute {
        if self.restore().await.is_some() {
            InitialRoute::Dashboard
        } else {
            InitialRoute::GetStarted
        }
    }

    /// 当前会话，未登录返回 `PickupError::NotLoggedIn`
    pub async fn current(&self) -> Result<Session> {
        self.load()
            .await?
            .ok_or_else(|| PickupError::NotLoggedIn.into())
    }

    /// 校验登录表单并发出 OTP
    pub fn start_login(&self, name: &str, phone_number: &str) -> Result<OtpChallenge, PickupError> {
        let request = validate_login(name, phone_number)?;
        Ok(OtpChallenge::new(request, self.otp_code.clone()))
    }

    /// 校验 OTP，通过后保存会话
    pub async fn complete_login(&self, challenge: &OtpChallenge, otp: &str) -> Result<Session> {
        let request = challenge.verify(otp)?;
        self.login(&request.name, &request.phone_number).await
    }

    /// 直接写入会话（姓名或手机号为空时拒绝）
    pub async fn login(&self, name: &str, phone_number: &str) -> Result<Session> {
        if name.is_empty() {
            return Err(PickupError::EmptyName.into());
        }
        if phone_number.is_empty() {
            return Err(PickupError::InvalidPhone.into());
        }
        self.dao.set_item(KEY_USER_PHONE, phone_number).await?;
        self.dao.set_item(KEY_USER_NAME, name).await?;
        info!("[Session] ✅ 登录成功: {} / {}", name, phone_number);
        Ok(Session {
            user_name: name.to_string(),
            user_phone: phone_number.to_string(),
        })
    }

    /// 退出登录，删除两项会话数据
    pub async fn logout(&self) -> Result<()> {
        self.dao.remove_item(KEY_USER_PHONE).await?;
        self.dao.remove_item(KEY_USER_NAME).await?;
        info!("[Session] 👋 已退出登录");
        Ok(())
    }
}
