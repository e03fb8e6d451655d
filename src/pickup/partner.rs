//! 骑手端服务
//!
//! 分配给当前骑手的取件列表，以及单条取件的状态推进流程（`PickupWorkflow`）

use crate::pickup::error::PickupError;
use crate::pickup::order::lifecycle::{self, next_action, NextAction};
use crate::pickup::order::listener::{EmptyPickupListener, PickupListener};
use crate::pickup::order::models::{Pickup, PickupItem, PickupUpdate};
use crate::pickup::order::query::{self, PickupFilter};
use crate::pickup::order::store::PickupStore;
use crate::pickup::session::Session;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 骑手端客户端
pub struct PartnerClient {
    store: Arc<dyn PickupStore>,
    session: Session,
    listener: Arc<dyn PickupListener>,
}

impl PartnerClient {
    pub fn new(store: Arc<dyn PickupStore>, session: Session) -> Self {
        Self::with_listener(store, session, Arc::new(EmptyPickupListener))
    }

    pub fn with_listener(
        store: Arc<dyn PickupStore>,
        session: Session,
        listener: Arc<dyn PickupListener>,
    ) -> Self {
        Self {
            store,
            session,
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

    /// 拉取全量后过滤出分配给当前骑手的记录，按创建时间倒序
    async fn fetch_assigned(&self) -> Result<Vec<Pickup>> {
        let all = self.store.list_pickups().await?;
        let mut assigned = query::for_partner(all, &self.session.user_phone);
        query::sort_newest_first(&mut assigned);
        debug!(
            "[Partner] 骑手 {} 共分配 {} 条取件",
            self.session.user_phone,
            assigned.len()
        );
        Ok(assigned)
    }

    /// 分配给我的取件（状态筛选 + 客户姓名 / 地址搜索）
    pub async fn assigned_pickups(&self, filter: &PickupFilter) -> Result<Vec<Pickup>> {
        match self.fetch_assigned().await {
            Ok(assigned) => {
                let filtered = query::apply_partner_filter(&assigned, filter);
                if let Ok(json) = serde_json::to_string(&filtered) {
                    self.listener.on_pickup_list_changed(json).await;
                }
                Ok(filtered)
            }
            Err(e) => {
                error!("[Partner] 加载分配列表失败: {:?}", e);
                self.listener
                    .on_alert("Error".to_string(), "Failed to load pickups.".to_string())
                    .await;
                Err(e)
            }
        }
    }

    /// 最新分配的一条取件（首页的流程入口）
    pub async fn latest_assigned(&self) -> Result<Pickup> {
        let assigned = match self.fetch_assigned().await {
            Ok(assigned) => assigned,
            Err(e) => {
                error!("[Partner] 获取最新取件失败: {:?}", e);
                self.listener
                    .on_alert("Error".to_string(), "Could not fetch pickups.".to_string())
                    .await;
                return Err(e);
            }
        };
        match assigned.into_iter().next() {
            Some(pickup) => Ok(pickup),
            None => {
                let err = PickupError::NoAssignedPickup;
                self.listener
                    .on_alert("No Assigned Pickup".to_string(), err.to_string())
                    .await;
                Err(err.into())
            }
        }
    }

    /// 打开单条取件的处理流程
    pub async fn open_workflow(&self, id: &str) -> Result<PickupWorkflow> {
        let pickup = match self.store.get_pickup(id).await {
            Ok(pickup) => pickup,
            Err(e) => {
                error!("[Partner] 获取取件 {} 详情失败: {:?}", id, e);
                self.listener
                    .on_alert("Error".to_string(), "Failed to fetch pickup details.".to_string())
                    .await;
                return Err(e);
            }
        };
        if pickup.partner_phone != self.session.user_phone {
            let err = PickupError::NotOwner(id.to_string());
            self.listener
                .on_alert("Error".to_string(), err.to_string())
                .await;
            return Err(err.into());
        }
        info!("[Partner] 打开取件流程 id={}, 当前状态={}", id, pickup.status);
        Ok(PickupWorkflow::new(
            self.store.clone(),
            pickup,
            self.listener.clone(),
        ))
    }
}

/// 流程中的交互阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStage {
    /// 无待输入内容
    Idle,
    /// 等待输入取件码
    AwaitingCode,
    /// 取件码已通过，等待录入物品
    AwaitingItems,
}

/// `advance` 的结果
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// 状态已写入，返回最新记录
    Updated(Pickup),
    /// 需要先输入取件码（Accepted → In-Process 不直接写入）
    CodeRequired,
}

/// 单条取件的状态推进流程
///
/// 远端写入失败时只提示，不修改本地记录，也不重试
pub struct PickupWorkflow {
    store: Arc<dyn PickupStore>,
    pickup: Pickup,
    stage: WorkflowStage,
    listener: Arc<dyn PickupListener>,
}

impl PickupWorkflow {
    pub fn new(store: Arc<dyn PickupStore>, pickup: Pickup, listener: Arc<dyn PickupListener>) -> Self {
        Self {
            store,
            pickup,
            stage: WorkflowStage::Idle,
            listener,
        }
    }

    pub fn pickup(&self) -> &Pickup {
        &self.pickup
    }

    pub fn stage(&self) -> WorkflowStage {
        self.stage
    }

    pub fn next_action(&self) -> NextAction {
        next_action(self.pickup.status)
    }

    async fn alert(&self, title: &str, message: &str) {
        self.listener
            .on_alert(title.to_string(), message.to_string())
            .await;
    }

    /// 业务校验失败：提示后返回错误
    async fn reject<T>(&self, title: &str, err: PickupError) -> Result<T> {
        warn!("[Workflow] 取件 {} 操作被拒绝: {}", self.pickup.id, err);
        self.alert(title, &err.to_string()).await;
        Err(err.into())
    }

    /// 写入远端，成功后替换本地记录
    async fn write(&mut self, update: PickupUpdate, success_message: &str) -> Result<Pickup> {
        match self.store.update_pickup(&self.pickup.id, &update).await {
            Ok(updated) => {
                info!(
                    "[Workflow] ✅ 取件 {} 状态: {} → {}",
                    self.pickup.id, self.pickup.status, updated.status
                );
                self.pickup = updated.clone();
                self.alert("Success", success_message).await;
                if let Ok(json) = serde_json::to_string(&updated) {
                    self.listener.on_pickup_changed(json).await;
                }
                Ok(updated)
            }
            Err(e) => {
                error!("[Workflow] 更新取件 {} 失败: {:?}", self.pickup.id, e);
                self.alert("Error", "Failed to update status.").await;
                Err(e)
            }
        }
    }

    /// 重新拉取记录
    pub async fn refresh(&mut self) -> Result<&Pickup> {
        match self.store.get_pickup(&self.pickup.id).await {
            Ok(pickup) => {
                self.pickup = pickup;
                Ok(&self.pickup)
            }
            Err(e) => {
                error!("[Workflow] 刷新取件 {} 失败: {:?}", self.pickup.id, e);
                self.alert("Error", "Failed to fetch pickup details.").await;
                Err(e)
            }
        }
    }

    /// 推进到下一个状态
    pub async fn advance(&mut self) -> Result<AdvanceOutcome> {
        match self.next_action() {
            NextAction::Accept => {
                let update = match lifecycle::accept_update(&self.pickup) {
                    Ok(update) => update,
                    Err(err) => return self.reject("Error", err).await,
                };
                let updated = self.write(update, "Pickup accepted.").await?;
                self.stage = WorkflowStage::AwaitingCode;
                Ok(AdvanceOutcome::Updated(updated))
            }
            NextAction::EnterCode => {
                self.stage = WorkflowStage::AwaitingCode;
                Ok(AdvanceOutcome::CodeRequired)
            }
            NextAction::RequestApproval => self.request_approval().await.map(AdvanceOutcome::Updated),
            NextAction::AwaitCustomerApproval => {
                self.reject("Info", PickupError::AwaitingCustomerApproval).await
            }
            NextAction::Done => self.reject("Info", PickupError::AlreadyCompleted).await,
        }
    }

    /// 提交取件码，成功后进入物品录入阶段
    pub async fn submit_code(&mut self, input: &str) -> Result<()> {
        match lifecycle::verify_pickup_code(&self.pickup, input) {
            Ok(()) => {
                info!("[Workflow] 🔑 取件 {} 取件码校验通过", self.pickup.id);
                self.stage = WorkflowStage::AwaitingItems;
                Ok(())
            }
            Err(PickupError::InvalidPickupCode) => {
                warn!("[Workflow] ❌ 取件 {} 取件码错误", self.pickup.id);
                self.reset_code_stage();
                self.alert("Invalid Code", "The pickup code you entered is incorrect.")
                    .await;
                Err(PickupError::InvalidPickupCode.into())
            }
            Err(err) => {
                self.reset_code_stage();
                self.reject("Error", err).await
            }
        }
    }

    /// 取件码校验失败后，之前通过的校验作废
    fn reset_code_stage(&mut self) {
        self.stage = if self.next_action() == NextAction::EnterCode {
            WorkflowStage::AwaitingCode
        } else {
            WorkflowStage::Idle
        };
    }

    /// 提交物品明细（Accepted → In-Process）
    pub async fn submit_items(&mut self, items: Vec<PickupItem>) -> Result<Pickup> {
        if self.stage != WorkflowStage::AwaitingItems {
            return self.reject("Error", PickupError::CodeNotVerified).await;
        }
        let validated = match lifecycle::validate_items(&items) {
            Ok(validated) => validated,
            Err(err) => return self.reject("Error", err).await,
        };
        let update = match lifecycle::start_processing_update(&self.pickup, validated) {
            Ok(update) => update,
            Err(err) => return self.reject("Error", err).await,
        };
        let updated = self.write(update, "Status updated to In-Process").await?;
        self.stage = WorkflowStage::Idle;
        Ok(updated)
    }

    /// 提交给客户确认（In-Process → Pending for Approval）
    pub async fn request_approval(&mut self) -> Result<Pickup> {
        let update = match lifecycle::request_approval_update(&self.pickup) {
            Ok(update) => update,
            Err(err) => return self.reject("Error", err).await,
        };
        self.write(update, "Submitted for customer approval").await
    }
}
