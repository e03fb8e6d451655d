pub mod pickup;

// 重新导出常用类型和函数，方便外部使用
pub use pickup::{
    config::{AppKind, ClientConfig},
    customer::{CustomerClient, ScheduleRequest},
    error::PickupError,
    order::{
        MemoryPickupStore, Pickup, PickupApi, PickupFilter, PickupItem, PickupListener,
        PickupStatus, PickupStore, StatusFilter,
    },
    partner::{AdvanceOutcome, PartnerClient, PickupWorkflow, WorkflowStage},
    session::{InitialRoute, Session, SessionManager},
};
