//! 取件生命周期状态机
//!
//! Pending → Accepted → In-Process → Pending for Approval → Completed
//!
//! 远端存储不做任何校验，所有状态约束都在这里完成：任何写入都必须是
//! 当前状态的直接后继。本模块只包含纯逻辑，不发起网络请求。

use crate::pickup::error::PickupError;
use crate::pickup::order::models::{Pickup, PickupItem, PickupStatus, PickupUpdate};

/// 当前状态下下一步应执行的动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextAction {
    /// 骑手接单（Pending → Accepted）
    Accept,
    /// 骑手输入取件码并录入物品（Accepted → In-Process）
    EnterCode,
    /// 骑手提交给客户确认（In-Process → Pending for Approval）
    RequestApproval,
    /// 等待客户确认（Pending for Approval → Completed，由客户端触发）
    AwaitCustomerApproval,
    /// 已完成，无后续动作
    Done,
}

pub fn next_action(status: PickupStatus) -> NextAction {
    match status {
        PickupStatus::Pending => NextAction::Accept,
        PickupStatus::Accepted => NextAction::EnterCode,
        PickupStatus::InProcess => NextAction::RequestApproval,
        PickupStatus::PendingForApproval => NextAction::AwaitCustomerApproval,
        PickupStatus::Completed => NextAction::Done,
    }
}

/// 校验 `from → to` 是否为合法的单步前进
pub fn ensure_forward(from: PickupStatus, to: PickupStatus) -> Result<(), PickupError> {
    match from.next() {
        None => Err(PickupError::AlreadyCompleted),
        Some(next) if next == to => Ok(()),
        Some(_) => Err(PickupError::InvalidTransition { from, to }),
    }
}

/// 校验骑手输入的取件码（仅在 Accepted 状态下有意义，按原样字符串比较）
pub fn verify_pickup_code(pickup: &Pickup, input: &str) -> Result<(), PickupError> {
    ensure_forward(pickup.status, PickupStatus::InProcess)?;
    if input.trim().is_empty() {
        return Err(PickupError::EmptyPickupCode);
    }
    if input != pickup.pickup_code {
        return Err(PickupError::InvalidPickupCode);
    }
    Ok(())
}

/// 校验通过的物品明细
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedItems {
    pub items: Vec<PickupItem>,
    pub item_list: Vec<String>,
    pub total_amount: f64,
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// 校验物品明细：至少一行、字段非空、数量和价格为数字
pub fn validate_items(items: &[PickupItem]) -> Result<ValidatedItems, PickupError> {
    if items.is_empty() {
        return Err(PickupError::NoItems);
    }
    let has_empty = items.iter().any(|item| {
        item.name.trim().is_empty() || item.quantity.trim().is_empty() || item.price.trim().is_empty()
    });
    if has_empty {
        return Err(PickupError::EmptyItemField);
    }
    let all_numeric = items
        .iter()
        .all(|item| parse_number(&item.quantity).is_some() && parse_number(&item.price).is_some());
    if !all_numeric {
        return Err(PickupError::NonNumericItem);
    }

    Ok(ValidatedItems {
        items: items.to_vec(),
        item_list: format_item_list(items),
        total_amount: total_amount(items),
    })
}

/// 总金额 = 各行价格之和（不乘数量）
pub fn total_amount(items: &[PickupItem]) -> f64 {
    items
        .iter()
        .map(|item| parse_number(&item.price).unwrap_or(0.0))
        .sum()
}

/// 物品展示列表，格式为 `名称 x 数量`
pub fn format_item_list(items: &[PickupItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| format!("{} x {}", item.name, item.quantity))
        .collect()
}

/// Pending → Accepted
pub fn accept_update(pickup: &Pickup) -> Result<PickupUpdate, PickupError> {
    ensure_forward(pickup.status, PickupStatus::Accepted)?;
    Ok(PickupUpdate::status(PickupStatus::Accepted))
}

/// Accepted → In-Process，同时写入物品明细与总金额
pub fn start_processing_update(
    pickup: &Pickup,
    items: ValidatedItems,
) -> Result<PickupUpdate, PickupError> {
    ensure_forward(pickup.status, PickupStatus::InProcess)?;
    Ok(PickupUpdate {
        status: Some(PickupStatus::InProcess),
        items: Some(items.items),
        item_list: Some(items.item_list),
        total_amount: Some(items.total_amount),
    })
}

/// In-Process → Pending for Approval
pub fn request_approval_update(pickup: &Pickup) -> Result<PickupUpdate, PickupError> {
    ensure_forward(pickup.status, PickupStatus::PendingForApproval)?;
    Ok(PickupUpdate::status(PickupStatus::PendingForApproval))
}

/// Pending for Approval → Completed（客户确认）
pub fn approve_update(pickup: &Pickup) -> Result<PickupUpdate, PickupError> {
    ensure_forward(pickup.status, PickupStatus::Completed)?;
    Ok(PickupUpdate::status(PickupStatus::Completed))
}
