//! 本地过滤与排序
//!
//! 存储端没有查询能力，客户端拉取全量后在本地按身份过滤、按创建时间倒序排序，
//! 再按状态与关键字筛选。

use crate::pickup::order::models::{Pickup, PickupStatus};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// 首页展示的最近取件数量
pub const DASHBOARD_RECENT_LIMIT: usize = 5;

/// 状态筛选
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(PickupStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: PickupStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All"),
            StatusFilter::Only(status) => write!(f, "{}", status),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Ok(StatusFilter::Only(s.parse()?))
    }
}

/// 列表筛选条件（状态 + 关键字）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickupFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl PickupFilter {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    /// 去掉首尾空白后的小写关键字，空串表示不按关键字过滤
    fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }
}

/// 客户视角：按姓名 + 手机号过滤
pub fn for_customer(pickups: Vec<Pickup>, user_name: &str, user_phone: &str) -> Vec<Pickup> {
    pickups
        .into_iter()
        .filter(|p| p.user_name == user_name && p.user_phone == user_phone)
        .collect()
}

/// 骑手视角：按骑手手机号过滤
pub fn for_partner(pickups: Vec<Pickup>, partner_phone: &str) -> Vec<Pickup> {
    pickups
        .into_iter()
        .filter(|p| p.partner_phone == partner_phone)
        .collect()
}

/// 按创建时间倒序排序，缺少时间戳的记录排在最后（稳定排序）
pub fn sort_newest_first(pickups: &mut [Pickup]) {
    pickups.sort_by(|a, b| match (&a.created_at, &b.created_at) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// 客户订单历史筛选：状态 + 地址关键字
pub fn apply_customer_filter(pickups: &[Pickup], filter: &PickupFilter) -> Vec<Pickup> {
    let needle = filter.needle();
    pickups
        .iter()
        .filter(|p| filter.status.matches(p.status))
        .filter(|p| match &needle {
            Some(n) => p.address.to_lowercase().contains(n),
            None => true,
        })
        .cloned()
        .collect()
}

/// 骑手任务列表筛选：状态 + 客户姓名或地址关键字
pub fn apply_partner_filter(pickups: &[Pickup], filter: &PickupFilter) -> Vec<Pickup> {
    let needle = filter.needle();
    pickups
        .iter()
        .filter(|p| filter.status.matches(p.status))
        .filter(|p| match &needle {
            Some(n) => p.user_name.to_lowercase().contains(n) || p.address.to_lowercase().contains(n),
            None => true,
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn pickup(id: &str, name: &str, phone: &str, partner: &str, secs: Option<i64>) -> Pickup {
        Pickup {
            id: id.to_string(),
            created_at: secs.and_then(|s| Utc.timestamp_opt(s, 0).single()),
            user_name: name.to_string(),
            user_phone: phone.to_string(),
            partner_phone: partner.to_string(),
            address: format!("{} Main Street", id),
            map_link: String::new(),
            pickup_date: "Sat Jul 05 2025".to_string(),
            time_slot: "10–11 AM".to_string(),
            status: PickupStatus::Pending,
            pickup_code: "1111".to_string(),
            items: Vec::new(),
            item_list: Vec::new(),
            total_amount: 0.0,
        }
    }

    #[test]
    fn customer_view_requires_name_and_phone() {
        let all = vec![
            pickup("1", "Asha", "9000000001", "9391234123", Some(1)),
            pickup("2", "Asha", "9000000002", "9391234123", Some(2)),
            pickup("3", "Ravi", "9000000001", "9391234123", Some(3)),
        ];
        let mine = for_customer(all, "Asha", "9000000001");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, "1");
    }

    #[test]
    fn partner_view_matches_partner_phone() {
        let all = vec![
            pickup("1", "Asha", "9000000001", "9391234123", Some(1)),
            pickup("2", "Ravi", "9000000002", "9111111111", Some(2)),
        ];
        let mine = for_partner(all, "9391234123");
        assert_eq!(mine.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["1"]);
    }

    #[test]
    fn sorts_newest_first_with_missing_timestamps_last() {
        let mut list = vec![
            pickup("a", "Asha", "1", "p", Some(10)),
            pickup("b", "Asha", "1", "p", None),
            pickup("c", "Asha", "1", "p", Some(30)),
            pickup("d", "Asha", "1", "p", Some(20)),
        ];
        sort_newest_first(&mut list);
        let ids: Vec<_> = list.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "d", "a", "b"]);
    }

    #[test]
    fn status_and_search_filters_combine() {
        let mut accepted = pickup("1", "Asha", "1", "p", Some(1));
        accepted.status = PickupStatus::Accepted;
        accepted.address = "Green Park Colony".to_string();
        let pending = pickup("2", "Meera", "1", "p", Some(2));
        let list = vec![accepted, pending];

        let by_status = PickupFilter::new(StatusFilter::Only(PickupStatus::Accepted), "");
        assert_eq!(apply_customer_filter(&list, &by_status).len(), 1);

        let by_address = PickupFilter::new(StatusFilter::All, "  green PARK ");
        assert_eq!(apply_customer_filter(&list, &by_address)[0].id, "1");

        // 客户端只按地址搜索，骑手端额外匹配客户姓名
        let by_name = PickupFilter::new(StatusFilter::All, "meera");
        assert!(apply_customer_filter(&list, &by_name).is_empty());
        assert_eq!(apply_partner_filter(&list, &by_name)[0].id, "2");
    }

    #[test]
    fn status_filter_parses_all() {
        assert_eq!("All".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!(
            "completed".parse::<StatusFilter>().unwrap(),
            StatusFilter::Only(PickupStatus::Completed)
        );
    }
}
