pub mod auth;
pub mod config;
pub mod customer;
pub mod db;
pub mod error;
pub mod order;
pub mod partner;
pub mod serialization;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use config::{AppKind, ClientConfig};
pub use customer::{CustomerClient, ScheduleRequest, TIME_SLOTS};
pub use error::PickupError;
pub use partner::{AdvanceOutcome, PartnerClient, PickupWorkflow, WorkflowStage};
pub use session::{InitialRoute, Session, SessionManager};
