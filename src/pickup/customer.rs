//! 客户端服务
//!
//! 预约取件、首页最近记录、订单历史与确认完成

use crate::pickup::error::PickupError;
use crate::pickup::order::lifecycle;
use crate::pickup::order::listener::{EmptyPickupListener, PickupListener};
use crate::pickup::order::models::{NewPickup, Pickup, PickupStatus};
use crate::pickup::order::query::{self, PickupFilter, DASHBOARD_RECENT_LIMIT};
use crate::pickup::order::store::PickupStore;
use crate::pickup::serialization::{format_pickup_date, generate_pickup_code};
use crate::pickup::session::Session;
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, error, info};

/// 可预约的时间段
pub const TIME_SLOTS: [&str; 5] = ["10–11 AM", "11–12 PM", "12–1 PM", "2–3 PM", "3–4 PM"];

/// 预约表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub pickup_date: NaiveDate,
    pub time_slot: String,
    pub address: String,
    /// 地图链接（可选，空串表示未填写）
    pub map_link: String,
}

/// 客户端
pub struct CustomerClient {
    store: Arc<dyn PickupStore>,
    session: Session,
    partner_phone: String,
    listener: Arc<dyn PickupListener>,
}

impl CustomerClient {
    pub fn new(store: Arc<dyn PickupStore>, session: Session, partner_phone: impl Into<String>) -> Self {
        Self::with_listener(store, session, partner_phone, Arc::new(EmptyPickupListener))
    }

    pub fn with_listener(
        store: Arc<dyn PickupStore>,
        session: Session,
        partner_phone: impl Into<String>,
        listener: Arc<dyn PickupListener>,
    ) -> Self {
        Self {
            store,
            session,
            partner_phone: partner_phone.into(),
            listener,
        }
    }

    /// 注册监听器
    pub fn set_listener(&mut self, listener: Arc<dyn PickupListener>) {
        self.listener = listener;
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    async fn alert(&self, title: &str, message: &str) {
        self.listener
            .on_alert(title.to_string(), message.to_string())
            .await;
    }

    async fn notify_list(&self, pickups: &[Pickup]) {
        if let Ok(json) = serde_json::to_string(pickups) {
            self.listener.on_pickup_list_changed(json).await;
        }
    }

    async fn notify_changed(&self, pickup: &Pickup) {
        if let Ok(json) = serde_json::to_string(pickup) {
            self.listener.on_pickup_changed(json).await;
        }
    }

    /// 拉取全量后过滤出当前客户的记录，按创建时间倒序
    async fn fetch_my_pickups(&self) -> Result<Vec<Pickup>> {
        let all = self.store.list_pickups().await?;
        let mut mine = query::for_customer(all, &self.session.user_name, &self.session.user_phone);
        query::sort_newest_first(&mut mine);
        debug!(
            "[Customer] 当前用户 {} 共有 {} 条取件记录",
            self.session.user_phone,
            mine.len()
        );
        Ok(mine)
    }

    /// 预约取件
    pub async fn schedule_pickup(&self, request: ScheduleRequest) -> Result<Pickup> {
        let time_slot = request.time_slot.trim();
        let address = request.address.trim();
        if time_slot.is_empty() || address.is_empty() {
            let err = PickupError::MissingScheduleFields;
            self.alert("Error", &err.to_string()).await;
            return Err(err.into());
        }
        if !TIME_SLOTS.contains(&time_slot) {
            let err = PickupError::UnknownTimeSlot(time_slot.to_string());
            self.alert("Error", &err.to_string()).await;
            return Err(err.into());
        }

        let new_pickup = NewPickup {
            pickup_date: format_pickup_date(request.pickup_date),
            time_slot: time_slot.to_string(),
            address: address.to_string(),
            map_link: request.map_link.trim().to_string(),
            status: PickupStatus::Pending,
            pickup_code: generate_pickup_code(),
            total_amount: 0.0,
            user_name: self.session.user_name.clone(),
            user_phone: self.session.user_phone.clone(),
            partner_phone: self.partner_phone.clone(),
        };

        info!(
            "[Customer] 📦 预约取件: {} {}，地址: {}",
            new_pickup.pickup_date, new_pickup.time_slot, new_pickup.address
        );
        match self.store.create_pickup(&new_pickup).await {
            Ok(created) => {
                self.alert("Success", "Pickup request scheduled!").await;
                self.notify_changed(&created).await;
                Ok(created)
            }
            Err(e) => {
                error!("[Customer] 预约取件失败: {:?}", e);
                self.alert("Error", "Failed to submit pickup request.").await;
                Err(e)
            }
        }
    }

    /// 首页：最近的几条取件
    pub async fn dashboard(&self) -> Result<Vec<Pickup>> {
        match self.fetch_my_pickups().await {
            Ok(mut mine) => {
                mine.truncate(DASHBOARD_RECENT_LIMIT);
                self.notify_list(&mine).await;
                Ok(mine)
            }
            Err(e) => {
                error!("[Customer] 加载首页取件失败: {:?}", e);
                self.alert("Error", "Failed to load pickup history.").await;
                Err(e)
            }
        }
    }

    /// 订单历史（状态筛选 + 地址搜索）
    pub async fn order_history(&self, filter: &PickupFilter) -> Result<Vec<Pickup>> {
        match self.fetch_my_pickups().await {
            Ok(mine) => {
                let filtered = query::apply_customer_filter(&mine, filter);
                debug!(
                    "[Customer] 订单历史筛选 status={}, search={:?}: {} / {}",
                    filter.status,
                    filter.search,
                    filtered.len(),
                    mine.len()
                );
                self.notify_list(&filtered).await;
                Ok(filtered)
            }
            Err(e) => {
                error!("[Customer] 加载订单历史失败: {:?}", e);
                self.alert("Error", "Failed to fetch order history.").await;
                Err(e)
            }
        }
    }

    /// 确认完成（Pending for Approval → Completed）
    pub async fn approve(&self, id: &str) -> Result<Pickup> {
        let pickup = match self.store.get_pickup(id).await {
            Ok(pickup) => pickup,
            Err(e) => {
                error!("[Customer] 获取取件 {} 失败: {:?}", id, e);
                self.alert("Error", "Failed to update order.").await;
                return Err(e);
            }
        };

        if pickup.user_name != self.session.user_name || pickup.user_phone != self.session.user_phone {
            let err = PickupError::NotOwner(id.to_string());
            self.alert("Error", &err.to_string()).await;
            return Err(err.into());
        }

        let update = match lifecycle::approve_update(&pickup) {
            Ok(update) => update,
            Err(err) => {
                self.alert("Error", &err.to_string()).await;
                return Err(err.into());
            }
        };

        match self.store.update_pickup(id, &update).await {
            Ok(updated) => {
                info!("[Customer] ✅ 取件 {} 已确认完成", id);
                self.alert("Success", "Pickup approved and marked as Completed.")
                    .await;
                self.notify_changed(&updated).await;
                Ok(updated)
            }
            Err(e) => {
                error!("[Customer] 确认取件 {} 失败: {:?}", id, e);
                self.alert("Error", "Failed to update order.").await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickup::order::models::PickupUpdate;
    use crate::pickup::order::query::StatusFilter;
    use crate::pickup::order::store::MemoryPickupStore;
    use crate::pickup::testing::{FailingStore, RecordingListener};

    fn session(name: &str, phone: &str) -> Session {
        Session {
            user_name: name.to_string(),
            user_phone: phone.to_string(),
        }
    }

    fn request(address: &str) -> ScheduleRequest {
        ScheduleRequest {
            pickup_date: NaiveDate::from_ymd_opt(2025, 7, 5).unwrap(),
            time_slot: "2–3 PM".to_string(),
            address: address.to_string(),
            map_link: String::new(),
        }
    }

    #[tokio::test]
    async fn schedule_creates_pending_pickup_with_code() {
        let store = Arc::new(MemoryPickupStore::new());
        let client = CustomerClient::new(store.clone(), session("Asha", "9876543210"), "9391234123");

        let created = client.schedule_pickup(request("12 Lake Road")).await.unwrap();
        assert_eq!(created.status, PickupStatus::Pending);
        assert_eq!(created.pickup_code.len(), 4);
        assert_eq!(created.partner_phone, "9391234123");
        assert_eq!(created.pickup_date, "Sat Jul 05 2025");
        assert_eq!(created.total_amount, 0.0);
        assert_eq!(store.list_pickups().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn schedule_requires_slot_and_address() {
        let store = Arc::new(MemoryPickupStore::new());
        let listener = Arc::new(RecordingListener::default());
        let client = CustomerClient::with_listener(
            store.clone(),
            session("Asha", "9876543210"),
            "9391234123",
            listener.clone(),
        );

        let err = client.schedule_pickup(request("   ")).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PickupError>(),
            Some(&PickupError::MissingScheduleFields)
        );
        assert_eq!(
            listener.alerts().await,
            vec![("Error".to_string(), "Please fill in all required fields.".to_string())]
        );

        let mut bad_slot = request("12 Lake Road");
        bad_slot.time_slot = "9–10 PM".to_string();
        assert!(client.schedule_pickup(bad_slot).await.is_err());
        assert!(store.list_pickups().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dashboard_shows_five_newest_of_own_pickups() {
        let store = Arc::new(MemoryPickupStore::new());
        let asha = CustomerClient::new(store.clone(), session("Asha", "9876543210"), "9391234123");
        let ravi = CustomerClient::new(store.clone(), session("Ravi", "9000000001"), "9391234123");

        for i in 0..7 {
            asha.schedule_pickup(request(&format!("{} Lake Road", i)))
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        ravi.schedule_pickup(request("1 Hill Street")).await.unwrap();

        let recent = asha.dashboard().await.unwrap();
        assert_eq!(recent.len(), DASHBOARD_RECENT_LIMIT);
        assert!(recent.iter().all(|p| p.user_name == "Asha"));
        assert_eq!(recent[0].address, "6 Lake Road");

        let history = asha.order_history(&PickupFilter::default()).await.unwrap();
        assert_eq!(history.len(), 7);
    }

    #[tokio::test]
    async fn history_filters_by_status_and_address() {
        let store = Arc::new(MemoryPickupStore::new());
        let client = CustomerClient::new(store.clone(), session("Asha", "9876543210"), "9391234123");
        let first = client.schedule_pickup(request("Green Park")).await.unwrap();
        client.schedule_pickup(request("Old Town")).await.unwrap();
        store
            .update_pickup(&first.id, &PickupUpdate::status(PickupStatus::Accepted))
            .await
            .unwrap();

        let accepted = client
            .order_history(&PickupFilter::new(StatusFilter::Only(PickupStatus::Accepted), ""))
            .await
            .unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].id, first.id);

        let searched = client
            .order_history(&PickupFilter::new(StatusFilter::All, "old"))
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].address, "Old Town");
    }

    #[tokio::test]
    async fn approve_completes_pending_for_approval_only() {
        let store = Arc::new(MemoryPickupStore::new());
        let client = CustomerClient::new(store.clone(), session("Asha", "9876543210"), "9391234123");
        let created = client.schedule_pickup(request("Green Park")).await.unwrap();

        let err = client.approve(&created.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PickupError>(),
            Some(PickupError::InvalidTransition { .. })
        ));

        store
            .update_pickup(
                &created.id,
                &PickupUpdate::status(PickupStatus::PendingForApproval),
            )
            .await
            .unwrap();
        let done = client.approve(&created.id).await.unwrap();
        assert_eq!(done.status, PickupStatus::Completed);

        let err = client.approve(&created.id).await.unwrap_err();
        assert_eq!(
            err.downcast_ref::<PickupError>(),
            Some(&PickupError::AlreadyCompleted)
        );
    }

    #[tokio::test]
    async fn approve_rejects_other_customers_pickup() {
        let store = Arc::new(MemoryPickupStore::new());
        let asha = CustomerClient::new(store.clone(), session("Asha", "9876543210"), "9391234123");
        let ravi = CustomerClient::new(store.clone(), session("Ravi", "9000000001"), "9391234123");
        let created = asha.schedule_pickup(request("Green Park")).await.unwrap();
        store
            .update_pickup(
                &created.id,
                &PickupUpdate::status(PickupStatus::PendingForApproval),
            )
            .await
            .unwrap();

        let err = ravi.approve(&created.id).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PickupError>(),
            Some(PickupError::NotOwner(_))
        ));
    }

    #[tokio::test]
    async fn listener_sees_refreshes_and_writes() {
        let listener = Arc::new(RecordingListener::default());
        let mut client = CustomerClient::new(
            Arc::new(MemoryPickupStore::new()),
            session("Asha", "9876543210"),
            "9391234123",
        );
        client.set_listener(listener.clone());
        client.schedule_pickup(request("Green Park")).await.unwrap();
        client.dashboard().await.unwrap();
        client.order_history(&PickupFilter::default()).await.unwrap();

        assert_eq!(listener.change_events().await, 1);
        assert_eq!(listener.list_events().await, 2);
        assert_eq!(
            listener.alerts().await,
            vec![("Success".to_string(), "Pickup request scheduled!".to_string())]
        );
    }

    #[tokio::test]
    async fn remote_failure_surfaces_alert() {
        let listener = Arc::new(RecordingListener::default());
        let client = CustomerClient::with_listener(
            Arc::new(FailingStore),
            session("Asha", "9876543210"),
            "9391234123",
            listener.clone(),
        );

        assert!(client.schedule_pickup(request("Green Park")).await.is_err());
        assert!(client.dashboard().await.is_err());
        assert!(client.order_history(&PickupFilter::default()).await.is_err());

        let messages: Vec<String> = listener.alerts().await.into_iter().map(|(_, m)| m).collect();
        assert_eq!(
            messages,
            vec![
                "Failed to submit pickup request.".to_string(),
                "Failed to load pickup history.".to_string(),
                "Failed to fetch order history.".to_string(),
            ]
        );
    }
}
