//! 取件监听器回调接口

use async_trait::async_trait;

/// 取件监听器回调接口
///
/// 客户端与骑手端的服务对象通过它通知列表刷新、记录变更以及需要展示给用户的提示
#[async_trait]
pub trait PickupListener: Send + Sync {
    /// 列表刷新完成，参数为 JSON 数组字符串
    async fn on_pickup_list_changed(&self, pickups_json: String);

    /// 单条记录写入成功，参数为最新记录的 JSON 字符串
    async fn on_pickup_changed(&self, pickup_json: String);

    /// 需要展示给用户的提示（标题 + 内容）
    async fn on_alert(&self, title: String, message: String);
}

/// 默认空实现（无操作）
pub struct EmptyPickupListener;

#[async_trait]
impl PickupListener for EmptyPickupListener {
    async fn on_pickup_list_changed(&self, _pickups_json: String) {}
    async fn on_pickup_changed(&self, _pickup_json: String) {}
    async fn on_alert(&self, _title: String, _message: String) {}
}
