//! 会话数据访问层（DAO）
//!
//! 本地键值表 `local_session`，只存放 userPhone / userName 两项。

use anyhow::{Context, Result};
use sqlx::{Pool, Row, Sqlite};
use tracing::debug;

/// 会话 DAO（基于 sqlx）
#[derive(Clone)]
pub struct SessionDao {
    db: Pool<Sqlite>,
}

impl SessionDao {
    /// 创建新的会话 DAO
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// 读取单个键
    pub async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT value FROM local_session WHERE key = ?
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("查询会话键失败: {}", key))?;

        Ok(row.map(|m| m.get::<String, _>("value")))
    }

    /// 写入或覆盖单个键
    pub async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let sql = r#"
            INSERT INTO local_session (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
        "#;

        sqlx::query(sql)
            .bind(key)
            .bind(value)
            .bind(chrono::Utc::now().timestamp_millis())
            .execute(&self.db)
            .await
            .with_context(|| format!("保存会话键失败: {}", key))?;
        debug!("[SessionDAO] 已保存会话键: {}", key);
        Ok(())
    }

    /// 删除单个键
    pub async fn remove_item(&self, key: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM local_session WHERE key = ?
            "#,
        )
        .bind(key)
        .execute(&self.db)
        .await
        .with_context(|| format!("删除会话键失败: {}", key))?;
        debug!("[SessionDAO] 已删除会话键: {}", key);
        Ok(())
    }
}
