//! Due Selector：挑选今天该复习的条目并排序
//!
//! 资格：next_review_date ≤ today。排序：priority 降序，其次 next_review_date 升序（拖得越久越靠前），
//! 再按 id 升序保证结果稳定。没有到期条目时返回空列表，不是错误。

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;

use super::item::ItemRecord;
use crate::store::{ItemStore, StoreError};

/// 复习顺序（同时用于 list_all 的全量展示顺序）
pub fn review_order(a: &ItemRecord, b: &ItemRecord) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.next_review_date.cmp(&b.next_review_date))
        .then_with(|| a.id.cmp(&b.id))
}

/// 从任意条目集合中筛出到期条目，排序后截取前 limit 条
pub fn select_due<'a, I>(items: I, today: NaiveDate, limit: usize) -> Vec<ItemRecord>
where
    I: IntoIterator<Item = &'a ItemRecord>,
{
    let mut due: Vec<ItemRecord> = items
        .into_iter()
        .filter(|item| item.is_due(today))
        .cloned()
        .collect();
    due.sort_by(review_order);
    due.truncate(limit);
    due
}

/// 基于存储的选择器：由存储完成过滤与排序（SQLite 下推到 SQL）
#[derive(Clone)]
pub struct DueSelector {
    store: Arc<dyn ItemStore>,
}

impl DueSelector {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn select(&self, today: NaiveDate, limit: usize) -> Result<Vec<ItemRecord>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let batch = self.store.query_due(today, limit)?;
        tracing::debug!("Selected {} due items for {}", batch.len(), today);
        Ok(batch)
    }
}
