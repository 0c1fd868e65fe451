//! 内存存储：RwLock<Vec<ItemRecord>>，进程退出即丢失，适合测试

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use chrono::NaiveDate;

use super::{ItemStore, ItemUpdate, StoreError};
use crate::srs::{review_order, select_due, ItemId, ItemRecord};

#[derive(Debug)]
pub struct InMemoryItemStore {
    items: RwLock<Vec<ItemRecord>>,
    next_id: AtomicI64,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// 直接写入一条完整记录（测试用：构造任意调度状态，包括损坏的状态）
    pub fn put(&self, item: ItemRecord) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        self.next_id.fetch_max(item.id + 1, Ordering::SeqCst);
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemStore for InMemoryItemStore {
    fn insert(&self, word: &str, meaning: &str, today: NaiveDate) -> Result<ItemRecord, StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        if items.iter().any(|item| item.word == word) {
            return Err(StoreError::DuplicateKey(word.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = ItemRecord::new(id, word, meaning, today);
        items.push(record.clone());
        Ok(record)
    }

    fn query_due(&self, today: NaiveDate, limit: usize) -> Result<Vec<ItemRecord>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(select_due(items.iter(), today, limit))
    }

    fn update_fields(&self, id: ItemId, update: &ItemUpdate) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| StoreError::Poisoned)?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StoreError::NotFound(id))?;
        update.apply_to(item);
        Ok(())
    }

    fn get_by_id(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        Ok(items.iter().find(|item| item.id == id).cloned())
    }

    fn list_all(&self) -> Result<Vec<ItemRecord>, StoreError> {
        let items = self.items.read().map_err(|_| StoreError::Poisoned)?;
        let mut all = items.clone();
        all.sort_by(review_order);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, d).unwrap()
    }

    #[test]
    fn test_duplicate_word_rejected() {
        let store = InMemoryItemStore::new();
        store.insert("apple", "苹果", day(1)).unwrap();
        let err = store.insert("apple", "另一个苹果", day(1)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref w) if w == "apple"));
        // 只做精确匹配，不做大小写归一
        assert!(store.insert("Apple", "苹果", day(1)).is_ok());
    }

    #[test]
    fn test_update_missing_id() {
        let store = InMemoryItemStore::new();
        let err = store
            .update_fields(42, &ItemUpdate { priority: Some(1), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(42)));
    }

    #[test]
    fn test_put_keeps_ids_unique() {
        let store = InMemoryItemStore::new();
        store.put(ItemRecord::new(10, "ten", "十", day(1))).unwrap();
        let next = store.insert("eleven", "十一", day(1)).unwrap();
        assert_eq!(next.id, 11);
        assert_eq!(store.list_all().unwrap().len(), 2);
    }
}
