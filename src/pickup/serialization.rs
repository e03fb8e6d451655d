use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::Deserialize;

/// 字符串 / 数字 / null 统一反序列化为 String
///
/// mock 存储不校验类型，手机号、取件码等字段可能以数字形式返回
pub fn deserialize_string_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        Some(serde_json::Value::Bool(b)) => b.to_string(),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "期望字符串或数字，实际为: {}",
                other
            )))
        }
    })
}

/// 数组反序列化（null 或缺失时返回空 Vec）
pub fn deserialize_vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    let opt: Option<Vec<T>> = Deserialize::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// 金额反序列化：数字、数字字符串、null 都接受，无法解析时按 0 处理
pub fn deserialize_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// 时间戳反序列化：RFC3339 字符串或 Unix 毫秒，无法识别时为 None
pub fn deserialize_timestamp_lenient<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    })
}

/// 生成 4 位取件码（1000-9999）
pub fn generate_pickup_code() -> String {
    rand::thread_rng().gen_range(1000..=9999).to_string()
}

/// 按 JavaScript `Date.toDateString()` 的格式输出日期，例如 `Sat Oct 18 2026`
pub fn format_pickup_date(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}
