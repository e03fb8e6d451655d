//! 单测共用的辅助实现

use crate::pickup::order::listener::PickupListener;
use crate::pickup::order::models::{NewPickup, Pickup, PickupUpdate};
use crate::pickup::order::store::{MemoryPickupStore, PickupStore};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use tokio::sync::Mutex;

static INIT_LOGGER: Once = Once::new();

pub fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::EnvFilter;

        // 测试中默认打开当前 crate 和 sqlx 的 debug，关闭底层 HTTP 客户端的 debug 噪音
        let filter_layer = EnvFilter::new(
            "info,tesukupo_sdk_core=debug,sqlx=debug,hyper_util::client=info,reqwest=info",
        );

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_target(false)
            .with_test_writer();

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    });
}

/// 记录所有回调的监听器
#[derive(Default)]
pub struct RecordingListener {
    alerts: Mutex<Vec<(String, String)>>,
    lists: Mutex<Vec<String>>,
    changes: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub async fn alerts(&self) -> Vec<(String, String)> {
        self.alerts.lock().await.clone()
    }

    pub async fn list_events(&self) -> usize {
        self.lists.lock().await.len()
    }

    pub async fn change_events(&self) -> usize {
        self.changes.lock().await.len()
    }
}

#[async_trait]
impl PickupListener for RecordingListener {
    async fn on_pickup_list_changed(&self, pickups_json: String) {
        self.lists.lock().await.push(pickups_json);
    }

    async fn on_pickup_changed(&self, pickup_json: String) {
        self.changes.lock().await.push(pickup_json);
    }

    async fn on_alert(&self, title: String, message: String) {
        self.alerts.lock().await.push((title, message));
    }
}

fn unreachable_store() -> anyhow::Error {
    anyhow::anyhow!("请求失败: error sending request for url (http://127.0.0.1:9/pickups)")
}

/// 所有请求都失败的存储（模拟网络不可达）
pub struct FailingStore;

#[async_trait]
impl PickupStore for FailingStore {
    async fn list_pickups(&self) -> Result<Vec<Pickup>> {
        Err(unreachable_store())
    }

    async fn get_pickup(&self, _id: &str) -> Result<Pickup> {
        Err(unreachable_store())
    }

    async fn create_pickup(&self, _pickup: &NewPickup) -> Result<Pickup> {
        Err(unreachable_store())
    }

    async fn update_pickup(&self, _id: &str, _update: &PickupUpdate) -> Result<Pickup> {
        Err(unreachable_store())
    }
}

/// 读取正常、写入可按需失败的存储
pub struct FlakyStore {
    inner: Arc<MemoryPickupStore>,
    fail_updates: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryPickupStore>) -> Self {
        Self {
            inner,
            fail_updates: AtomicBool::new(false),
        }
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PickupStore for FlakyStore {
    async fn list_pickups(&self) -> Result<Vec<Pickup>> {
        self.inner.list_pickups().await
    }

    async fn get_pickup(&self, id: &str) -> Result<Pickup> {
        self.inner.get_pickup(id).await
    }

    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Pickup> {
        self.inner.create_pickup(pickup).await
    }

    async fn update_pickup(&self, id: &str, update: &PickupUpdate) -> Result<Pickup> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("HTTP 错误 500 Internal Server Error: \"\""));
        }
        self.inner.update_pickup(id, update).await
    }
}
