//! 取件 HTTP API 客户端
//!
//! 负责所有与远端 mock 存储之间的 HTTP 请求

use crate::pickup::order::models::{NewPickup, Pickup, PickupUpdate};
use crate::pickup::order::store::PickupStore;
use crate::pickup::types::handle_http_response;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 取件相关的 HTTP API 客户端
#[derive(Clone)]
pub struct PickupApi {
    client: reqwest::Client,
    api_base_url: String,
}

impl PickupApi {
    /// 创建新的取件 API 客户端
    ///
    /// `client` 由调用方构造，可复用连接池
    pub fn new(client: reqwest::Client, api_base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 按配置构造 reqwest 客户端（未设置超时时使用 reqwest 默认行为）
    pub fn from_base_url(api_base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::ClientBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("创建 HTTP 客户端失败")?;
        Ok(Self::new(client, api_base_url))
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn collection_url(&self) -> String {
        format!("{}/pickups", self.api_base_url)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/pickups/{}", self.api_base_url, id)
    }
}

#[async_trait]
impl PickupStore for PickupApi {
    /// 获取全部取件记录
    ///
    /// 存储端没有 schema，单条记录解析失败时跳过并记录警告，不影响整个列表
    async fn list_pickups(&self) -> Result<Vec<Pickup>> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.collection_url();

        info!("[PickupAPI] 📡 请求取件列表");
        debug!("[PickupAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("operationID", &operation_id)
            .send()
            .await
            .context("请求失败")?;

        let raw: Vec<serde_json::Value> = handle_http_response(response, "取件列表").await?;
        let total = raw.len();
        let pickups: Vec<Pickup> = raw
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Pickup>(value.clone()) {
                Ok(pickup) => Some(pickup),
                Err(e) => {
                    warn!("[PickupAPI] 跳过无法解析的取件记录: {:?}, 原始数据: {}", e, value);
                    None
                }
            })
            .collect();

        info!(
            "[PickupAPI] ✅ 取件列表响应，记录数: {}（跳过 {} 条）",
            pickups.len(),
            total - pickups.len()
        );
        Ok(pickups)
    }

    async fn get_pickup(&self, id: &str) -> Result<Pickup> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.item_url(id);

        info!("[PickupAPI] 📡 请求取件详情 id={}", id);
        debug!("[PickupAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("operationID", &operation_id)
            .send()
            .await
            .context("请求失败")?;

        handle_http_response(response, "取件详情").await
    }

    async fn create_pickup(&self, pickup: &NewPickup) -> Result<Pickup> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.collection_url();

        info!("[PickupAPI] 📡 创建取件请求");
        debug!(
            "[PickupAPI]   请求URL: {}, 操作ID: {}, 用户: {} / {}",
            url, operation_id, pickup.user_name, pickup.user_phone
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(pickup)
            .send()
            .await
            .context("请求失败")?;

        let created: Pickup = handle_http_response(response, "创建取件").await?;
        info!("[PickupAPI] ✅ 取件已创建 id={}", created.id);
        Ok(created)
    }

    async fn update_pickup(&self, id: &str, update: &PickupUpdate) -> Result<Pickup> {
        let operation_id = Uuid::new_v4().to_string();
        let url = self.item_url(id);

        info!("[PickupAPI] 📡 更新取件 id={}, 状态={:?}", id, update.status);
        debug!("[PickupAPI]   请求URL: {}, 操作ID: {}", url, operation_id);

        let response = self
            .client
            .put(&url)
            .header("Content-Type", "application/json")
            .header("operationID", &operation_id)
            .json(update)
            .send()
            .await
            .context("请求失败")?;

        handle_http_response(response, "更新取件").await
    }
}
