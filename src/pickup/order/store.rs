//! 取件存储抽象
//!
//! 远端 mock REST 存储只提供 list / get / create / update 四个操作，
//! 不做过滤、排序、分页，也不校验写入内容。

use crate::pickup::order::models::{NewPickup, Pickup, PickupUpdate};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

#[async_trait]
pub trait PickupStore: Send + Sync {
    /// GET /pickups
    async fn list_pickups(&self) -> Result<Vec<Pickup>>;

    /// GET /pickups/{id}
    async fn get_pickup(&self, id: &str) -> Result<Pickup>;

    /// POST /pickups
    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Pickup>;

    /// PUT /pickups/{id}，只覆盖请求体中出现的字段
    async fn update_pickup(&self, id: &str, update: &PickupUpdate) -> Result<Pickup>;
}

/// 内存实现，行为与 mock 存储一致：自增字符串 id、写入 createdAt、PUT 合并字段
#[derive(Default)]
pub struct MemoryPickupStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    pickups: Vec<Pickup>,
}

impl MemoryPickupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 直接写入一条记录（保留其 id 与 createdAt），用于预置数据
    pub async fn insert(&self, pickup: Pickup) {
        let mut state = self.inner.lock().await;
        if let Ok(n) = pickup.id.parse::<u64>() {
            state.next_id = state.next_id.max(n);
        }
        state.pickups.push(pickup);
    }
}

#[async_trait]
impl PickupStore for MemoryPickupStore {
    async fn list_pickups(&self) -> Result<Vec<Pickup>> {
        let state = self.inner.lock().await;
        Ok(state.pickups.clone())
    }

    async fn get_pickup(&self, id: &str) -> Result<Pickup> {
        let state = self.inner.lock().await;
        state
            .pickups
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("HTTP 错误 404 Not Found: \"Not found\""))
    }

    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Pickup> {
        let mut state = self.inner.lock().await;
        state.next_id += 1;
        let created = Pickup {
            id: state.next_id.to_string(),
            created_at: Some(Utc::now()),
            user_name: pickup.user_name.clone(),
            user_phone: pickup.user_phone.clone(),
            partner_phone: pickup.partner_phone.clone(),
            address: pickup.address.clone(),
            map_link: pickup.map_link.clone(),
            pickup_date: pickup.pickup_date.clone(),
            time_slot: pickup.time_slot.clone(),
            status: pickup.status,
            pickup_code: pickup.pickup_code.clone(),
            items: Vec::new(),
            item_list: Vec::new(),
            total_amount: pickup.total_amount,
        };
        debug!("[MemoryStore] 新增取件记录 id={}", created.id);
        state.pickups.push(created.clone());
        Ok(created)
    }

    async fn update_pickup(&self, id: &str, update: &PickupUpdate) -> Result<Pickup> {
        let mut state = self.inner.lock().await;
        let pickup = state
            .pickups
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| anyhow::anyhow!("HTTP 错误 404 Not Found: \"Not found\""))?;
        update.apply_to(pickup);
        debug!("[MemoryStore] 更新取件记录 id={}, 状态={}", id, pickup.status);
        Ok(pickup.clone())
    }
}
