//! 存储层：单词记录的持久化接口
//!
//! 会话只依赖 ItemStore trait：insert / query_due / update_fields / get_by_id / list_all。
//! 实现：SqliteItemStore（默认，单文件数据库）与 InMemoryItemStore（测试与临时使用）。
//! update_fields 对单条记录是原子的，多进程并发时由实现保证读-改-写不丢更新。

pub mod memory;
pub mod sqlite;

use chrono::NaiveDate;
use thiserror::Error;

use crate::enrich::EnrichmentData;
use crate::srs::{ItemId, ItemRecord, RecallState};

pub use memory::InMemoryItemStore;
pub use sqlite::SqliteItemStore;

#[derive(Error, Debug)]
pub enum StoreError {
    /// 单词已存在（非致命，报告给用户即可）
    #[error("Word already exists: {0}")]
    DuplicateKey(String),

    #[error("Item not found: {0}")]
    NotFound(ItemId),

    #[error("Corrupted record {id}: {reason}")]
    Corrupted { id: ItemId, reason: String },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// 部分字段更新：None 表示不修改该字段
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub repetition_count: Option<u32>,
    pub ease: Option<f64>,
    pub interval: Option<u32>,
    pub priority: Option<u32>,
    pub next_review_date: Option<NaiveDate>,
    pub last_review_date: Option<NaiveDate>,
    pub enrichment: Option<EnrichmentData>,
}

impl ItemUpdate {
    /// 一次复习后的全部调度字段
    pub fn schedule(
        state: RecallState,
        priority: u32,
        next_review_date: NaiveDate,
        reviewed_on: NaiveDate,
    ) -> Self {
        Self {
            repetition_count: Some(state.repetition_count),
            ease: Some(state.ease),
            interval: Some(state.interval),
            priority: Some(priority),
            next_review_date: Some(next_review_date),
            last_review_date: Some(reviewed_on),
            enrichment: None,
        }
    }

    /// 仅写入例句补充数据
    pub fn enrichment(data: EnrichmentData) -> Self {
        Self {
            enrichment: Some(data),
            ..Default::default()
        }
    }

    pub fn apply_to(&self, item: &mut ItemRecord) {
        if let Some(v) = self.repetition_count {
            item.repetition_count = v;
        }
        if let Some(v) = self.ease {
            item.ease = v;
        }
        if let Some(v) = self.interval {
            item.interval = v;
        }
        if let Some(v) = self.priority {
            item.priority = v;
        }
        if let Some(v) = self.next_review_date {
            item.next_review_date = v;
        }
        if let Some(v) = self.last_review_date {
            item.last_review_date = Some(v);
        }
        if let Some(ref v) = self.enrichment {
            item.enrichment = Some(v.clone());
        }
    }
}

/// 单词存储接口
pub trait ItemStore: Send + Sync {
    /// 新建记录（初始调度状态，当天到期）；word 已存在时返回 DuplicateKey
    fn insert(&self, word: &str, meaning: &str, today: NaiveDate) -> Result<ItemRecord, StoreError>;

    /// 到期条目，按 priority 降序、next_review_date 升序，最多 limit 条
    fn query_due(&self, today: NaiveDate, limit: usize) -> Result<Vec<ItemRecord>, StoreError>;

    /// 对单条记录做原子的部分更新；记录不存在时返回 NotFound
    fn update_fields(&self, id: ItemId, update: &ItemUpdate) -> Result<(), StoreError>;

    fn get_by_id(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError>;

    /// 全部条目，顺序与复习顺序一致
    fn list_all(&self) -> Result<Vec<ItemRecord>, StoreError>;
}
