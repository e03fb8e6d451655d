//! 取件业务错误定义
//!
//! 错误文案即展示给用户的提示语（弹窗 / 行内消息），调用方可以直接输出。
//! 网络与反序列化错误仍使用 anyhow 传递，业务错误可通过
//! `err.downcast_ref::<PickupError>()` 取回。

use crate::pickup::order::models::PickupStatus;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PickupError {
    #[error("Please enter your name")]
    EmptyName,

    #[error("Please enter a valid 10-digit mobile number")]
    InvalidPhone,

    #[error("Please enter all 6 digits of the OTP")]
    IncompleteOtp,

    #[error("Invalid OTP. Please try again.")]
    InvalidOtp,

    #[error("Please wait {0}s before requesting a new OTP")]
    ResendTooSoon(u64),

    #[error("Please fill in all required fields.")]
    MissingScheduleFields,

    #[error("Unknown time slot: {0}")]
    UnknownTimeSlot(String),

    #[error("Please enter the pickup code.")]
    EmptyPickupCode,

    #[error("Invalid Code")]
    InvalidPickupCode,

    #[error("Please add at least one item.")]
    NoItems,

    #[error("Please fill all item fields.")]
    EmptyItemField,

    #[error("Quantity and Price must be numeric values.")]
    NonNumericItem,

    #[error("Cannot move pickup from \"{from}\" to \"{to}\"")]
    InvalidTransition {
        from: PickupStatus,
        to: PickupStatus,
    },

    #[error("Pickup is already completed.")]
    AlreadyCompleted,

    #[error("Pickup is waiting for customer approval.")]
    AwaitingCustomerApproval,

    #[error("Pickup code has not been verified yet.")]
    CodeNotVerified,

    #[error("You have no assigned pickups to view workflow.")]
    NoAssignedPickup,

    #[error("Pickup {0} does not belong to the current user.")]
    NotOwner(String),

    #[error("Not logged in")]
    NotLoggedIn,
}
