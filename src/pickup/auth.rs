//! 登录占位流程：表单校验 + 固定 OTP 比对
//!
//! OTP 只是与配置中的字面值做字符串比较，不是安全机制。

use crate::pickup::error::PickupError;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// OTP 位数
pub const OTP_LENGTH: usize = 6;

/// 重新发送 OTP 的冷却时间
pub const OTP_RESEND_COOLDOWN: Duration = Duration::from_secs(30);

/// 校验通过的登录表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub name: String,
    pub phone_number: String,
}

/// 校验登录表单：姓名非空，手机号为 10 位数字
pub fn validate_login(name: &str, phone_number: &str) -> Result<LoginRequest, PickupError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PickupError::EmptyName);
    }
    let phone_number = phone_number.trim();
    if phone_number.len() != 10 || !phone_number.chars().all(|c| c.is_ascii_digit()) {
        return Err(PickupError::InvalidPhone);
    }
    Ok(LoginRequest {
        name: name.to_string(),
        phone_number: phone_number.to_string(),
    })
}

/// 一次 OTP 验证过程
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    request: LoginRequest,
    expected: String,
    issued_at: Instant,
}

impl OtpChallenge {
    pub fn new(request: LoginRequest, expected: impl Into<String>) -> Self {
        Self::issued_at(request, expected, Instant::now())
    }

    pub(crate) fn issued_at(
        request: LoginRequest,
        expected: impl Into<String>,
        issued_at: Instant,
    ) -> Self {
        info!("[Auth] 🔐 已向 {} 发送 OTP", request.phone_number);
        Self {
            request,
            expected: expected.into(),
            issued_at,
        }
    }

    pub fn request(&self) -> &LoginRequest {
        &self.request
    }

    /// 校验用户输入的 OTP
    pub fn verify(&self, otp: &str) -> Result<&LoginRequest, PickupError> {
        let otp = otp.trim();
        if otp.chars().count() < OTP_LENGTH {
            debug!("[Auth] OTP 位数不足: {}", otp.chars().count());
            return Err(PickupError::IncompleteOtp);
        }
        if otp != self.expected {
            warn!("[Auth] ❌ OTP 校验失败，手机号: {}", self.request.phone_number);
            return Err(PickupError::InvalidOtp);
        }
        info!("[Auth] ✅ OTP 校验通过，手机号: {}", self.request.phone_number);
        Ok(&self.request)
    }

    /// 距离允许重新发送还剩多久（已可重发时为 0）
    pub fn resend_remaining_at(&self, now: Instant) -> Duration {
        OTP_RESEND_COOLDOWN.saturating_sub(now.saturating_duration_since(self.issued_at))
    }

    pub fn resend_remaining(&self) -> Duration {
        self.resend_remaining_at(Instant::now())
    }

    /// 重新发送 OTP，冷却期内返回剩余秒数
    pub fn resend_at(&mut self, now: Instant) -> Result<(), PickupError> {
        let remaining = self.resend_remaining_at(now);
        if !remaining.is_zero() {
            return Err(PickupError::ResendTooSoon(remaining.as_secs().max(1)));
        }
        self.issued_at = now;
        info!("[Auth] 🔁 OTP 已重新发送至 {}", self.request.phone_number);
        Ok(())
    }

    pub fn resend(&mut self) -> Result<(), PickupError> {
        self.resend_at(Instant::now())
    }
}
