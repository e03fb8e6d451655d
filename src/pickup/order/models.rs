//! 取件记录模型定义
//!
//! 字段名与远端 mock REST 存储的 JSON 保持一致（camelCase）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 取件状态（固定顺序，只能逐级前进）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PickupStatus {
    #[serde(rename = "Pending")]
    Pending,
    #[serde(rename = "Accepted")]
    Accepted,
    #[serde(rename = "In-Process")]
    InProcess,
    #[serde(rename = "Pending for Approval")]
    PendingForApproval,
    #[serde(rename = "Completed")]
    Completed,
}

impl PickupStatus {
    /// 完整状态流转顺序
    pub const FLOW: [PickupStatus; 5] = [
        PickupStatus::Pending,
        PickupStatus::Accepted,
        PickupStatus::InProcess,
        PickupStatus::PendingForApproval,
        PickupStatus::Completed,
    ];

    /// 在 FLOW 中的下标
    pub fn index(self) -> usize {
        match self {
            PickupStatus::Pending => 0,
            PickupStatus::Accepted => 1,
            PickupStatus::InProcess => 2,
            PickupStatus::PendingForApproval => 3,
            PickupStatus::Completed => 4,
        }
    }

    /// 下一个状态，Completed 返回 None
    pub fn next(self) -> Option<PickupStatus> {
        Self::FLOW.get(self.index() + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// 远端存储使用的字符串形式
    pub fn as_str(self) -> &'static str {
        match self {
            PickupStatus::Pending => "Pending",
            PickupStatus::Accepted => "Accepted",
            PickupStatus::InProcess => "In-Process",
            PickupStatus::PendingForApproval => "Pending for Approval",
            PickupStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = anyhow::Error;

    /// 同时接受远端字符串和 CLI 友好的小写连字符写法（如 `pending-for-approval`）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::FLOW
            .iter()
            .copied()
            .find(|status| status.as_str().to_ascii_lowercase().replace('-', " ") == normalized)
            .ok_or_else(|| anyhow::anyhow!("未知的取件状态: {}", s))
    }
}

/// 单条物品明细（名称 / 数量 / 价格，均保留用户输入的原始字符串）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PickupItem {
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub quantity: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub price: String,
}

impl PickupItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            price: price.into(),
        }
    }
}

/// 远端存储中的取件记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    #[serde(deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub id: String,
    /// 创建时间（由存储端写入，可能缺失）
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::pickup::serialization::deserialize_timestamp_lenient"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub user_name: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub user_phone: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub partner_phone: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub address: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub map_link: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub pickup_date: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub time_slot: String,
    pub status: PickupStatus,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_string_lenient")]
    pub pickup_code: String,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_vec_or_null")]
    pub items: Vec<PickupItem>,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_vec_or_null")]
    pub item_list: Vec<String>,
    #[serde(default, deserialize_with = "crate::pickup::serialization::deserialize_amount")]
    pub total_amount: f64,
}

/// 新建取件请求体（POST /pickups）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPickup {
    pub pickup_date: String,
    pub time_slot: String,
    pub address: String,
    pub map_link: String,
    pub status: PickupStatus,
    pub pickup_code: String,
    pub total_amount: f64,
    pub user_name: String,
    pub user_phone: String,
    pub partner_phone: String,
}

/// 部分更新请求体（PUT /pickups/{id}），只序列化设置过的字段
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PickupStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<PickupItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

impl PickupUpdate {
    /// 仅修改状态
    pub fn status(status: PickupStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// 把更新应用到本地副本上（与存储端的合并语义一致）
    pub fn apply_to(&self, pickup: &mut Pickup) {
        if let Some(status) = self.status {
            pickup.status = status;
        }
        if let Some(items) = &self.items {
            pickup.items = items.clone();
        }
        if let Some(item_list) = &self.item_list {
            pickup.item_list = item_list.clone();
        }
        if let Some(total_amount) = self.total_amount {
            pickup.total_amount = total_amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_remote_strings() {
        for status in PickupStatus::FLOW {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: PickupStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn status_parses_cli_spellings() {
        assert_eq!(
            "pending-for-approval".parse::<PickupStatus>().unwrap(),
            PickupStatus::PendingForApproval
        );
        assert_eq!("In-Process".parse::<PickupStatus>().unwrap(), PickupStatus::InProcess);
        assert_eq!("in_process".parse::<PickupStatus>().unwrap(), PickupStatus::InProcess);
        assert!("Cancelled".parse::<PickupStatus>().is_err());
    }

    #[test]
    fn pickup_decodes_loose_mock_api_payload() {
        let raw = serde_json::json!({
            "id": "7",
            "createdAt": "2025-07-05T10:00:00.000Z",
            "userName": "Asha",
            "userPhone": 9876543210u64,
            "partnerPhone": "9391234123",
            "address": "12 Lake Road",
            "pickupDate": "Sat Jul 05 2025",
            "timeSlot": "10–11 AM",
            "status": "Pending for Approval",
            "pickupCode": 4821,
            "items": null,
            "totalAmount": "150.5"
        });
        let pickup: Pickup = serde_json::from_value(raw).unwrap();
        assert_eq!(pickup.user_phone, "9876543210");
        assert_eq!(pickup.pickup_code, "4821");
        assert!(pickup.items.is_empty());
        assert!(pickup.item_list.is_empty());
        assert_eq!(pickup.map_link, "");
        assert_eq!(pickup.total_amount, 150.5);
        assert_eq!(pickup.status, PickupStatus::PendingForApproval);
        assert!(pickup.created_at.is_some());
    }

    #[test]
    fn null_text_fields_decode_as_empty() {
        let raw = serde_json::json!({
            "id": "8",
            "createdAt": 1751709600000u64,
            "userName": null,
            "userPhone": "9876543210",
            "address": null,
            "pickupDate": null,
            "timeSlot": null,
            "status": "Pending",
            "items": [{ "name": null, "quantity": 2, "price": "30" }]
        });
        let pickup: Pickup = serde_json::from_value(raw).unwrap();
        assert_eq!(pickup.user_name, "");
        assert_eq!(pickup.address, "");
        assert_eq!(pickup.pickup_date, "");
        assert_eq!(pickup.time_slot, "");
        assert_eq!(pickup.items, vec![PickupItem::new("", "2", "30")]);
        assert_eq!(
            pickup.created_at.map(|at| at.timestamp_millis()),
            Some(1751709600000)
        );
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = PickupUpdate::status(PickupStatus::Completed);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "Completed" }));
    }
}
