//! SQLite 单词存储
//!
//! 单表 items，word 唯一；日期以 ISO `YYYY-MM-DD` 文本存储，文本比较即日期比较。
//! enrichment 列保存 EnrichmentData 的 JSON。连接由 Mutex 保护，可在后台补充任务间共享。

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

use super::{ItemStore, ItemUpdate, StoreError};
use crate::enrich::EnrichmentData;
use crate::srs::{ItemId, ItemRecord, INITIAL_EASE};

const COLUMNS: &str = "id, word, meaning, repetition_count, ease, interval, priority, \
                       next_review_date, last_review_date, enrichment";

pub struct SqliteItemStore {
    conn: Mutex<Connection>,
}

/// 数据库原始行：整数列保持 i64，转换为 ItemRecord 时再做范围检查
struct RawRow {
    id: i64,
    word: String,
    meaning: String,
    repetition_count: i64,
    ease: f64,
    interval: i64,
    priority: i64,
    next_review_date: NaiveDate,
    last_review_date: Option<NaiveDate>,
    enrichment: Option<String>,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            word: row.get(1)?,
            meaning: row.get(2)?,
            repetition_count: row.get(3)?,
            ease: row.get(4)?,
            interval: row.get(5)?,
            priority: row.get(6)?,
            next_review_date: row.get(7)?,
            last_review_date: row.get(8)?,
            enrichment: row.get(9)?,
        })
    }

    fn into_record(self) -> Result<ItemRecord, StoreError> {
        let id = self.id;
        let non_negative = |field: &str, value: i64| {
            u32::try_from(value).map_err(|_| StoreError::Corrupted {
                id,
                reason: format!("{} has invalid value {}", field, value),
            })
        };

        let enrichment = match self.enrichment {
            Some(json) => Some(serde_json::from_str::<EnrichmentData>(&json)?),
            None => None,
        };

        Ok(ItemRecord {
            id,
            repetition_count: non_negative("repetition_count", self.repetition_count)?,
            ease: self.ease,
            interval: non_negative("interval", self.interval)?,
            priority: non_negative("priority", self.priority)?,
            word: self.word,
            meaning: self.meaning,
            next_review_date: self.next_review_date,
            last_review_date: self.last_review_date,
            enrichment,
        })
    }
}

impl SqliteItemStore {
    /// 打开（或创建）数据库文件并建表
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path)?;
        Self::init_tables(&conn)?;
        tracing::debug!("Opened item store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 纯内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_tables(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                word TEXT NOT NULL UNIQUE,
                meaning TEXT NOT NULL,
                repetition_count INTEGER NOT NULL DEFAULT 0,
                ease REAL NOT NULL DEFAULT 2.5,
                interval INTEGER NOT NULL DEFAULT 1,
                priority INTEGER NOT NULL DEFAULT 0,
                next_review_date TEXT NOT NULL,
                last_review_date TEXT,
                enrichment TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_items_next_review ON items(next_review_date);
            "#,
        )?;
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: &[&dyn ToSql],
    ) -> Result<Vec<ItemRecord>, StoreError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, RawRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawRow::into_record).collect()
    }
}

impl ItemStore for SqliteItemStore {
    fn insert(&self, word: &str, meaning: &str, today: NaiveDate) -> Result<ItemRecord, StoreError> {
        let conn = self.conn()?;
        let result = conn.execute(
            "INSERT INTO items (word, meaning, repetition_count, ease, interval, priority, next_review_date, created_at)
             VALUES (?1, ?2, 0, ?3, 1, 0, ?4, ?5)",
            params![word, meaning, INITIAL_EASE, today, Utc::now().to_rfc3339()],
        );
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(StoreError::DuplicateKey(word.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        let id = conn.last_insert_rowid();
        tracing::info!("Inserted item {} ({})", id, word);
        Ok(ItemRecord::new(id, word, meaning, today))
    }

    fn query_due(&self, today: NaiveDate, limit: usize) -> Result<Vec<ItemRecord>, StoreError> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let sql = format!(
            "SELECT {} FROM items WHERE next_review_date <= ?1
             ORDER BY priority DESC, next_review_date ASC, id ASC LIMIT ?2",
            COLUMNS
        );
        Self::query_records(&conn, &sql, &[&today, &limit])
    }

    fn update_fields(&self, id: ItemId, update: &ItemUpdate) -> Result<(), StoreError> {
        let mut columns: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(v) = update.repetition_count {
            columns.push("repetition_count");
            values.push(Box::new(v));
        }
        if let Some(v) = update.ease {
            columns.push("ease");
            values.push(Box::new(v));
        }
        if let Some(v) = update.interval {
            columns.push("interval");
            values.push(Box::new(v));
        }
        if let Some(v) = update.priority {
            columns.push("priority");
            values.push(Box::new(v));
        }
        if let Some(v) = update.next_review_date {
            columns.push("next_review_date");
            values.push(Box::new(v));
        }
        if let Some(v) = update.last_review_date {
            columns.push("last_review_date");
            values.push(Box::new(v));
        }
        if let Some(ref v) = update.enrichment {
            columns.push("enrichment");
            values.push(Box::new(serde_json::to_string(v)?));
        }

        let conn = self.conn()?;

        if columns.is_empty() {
            let exists: Option<i64> = conn
                .query_row("SELECT id FROM items WHERE id = ?1", params![id], |row| row.get(0))
                .optional()?;
            return exists.map(|_| ()).ok_or(StoreError::NotFound(id));
        }

        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{} = ?{}", column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("UPDATE items SET {} WHERE id = ?{}", assignments, columns.len() + 1);
        values.push(Box::new(id));

        // 单条 UPDATE 语句，单行原子
        let changed = conn.execute(&sql, params_from_iter(values.iter()))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn get_by_id(&self, id: ItemId) -> Result<Option<ItemRecord>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM items WHERE id = ?1", COLUMNS),
                params![id],
                RawRow::read,
            )
            .optional()?;
        row.map(RawRow::into_record).transpose()
    }

    fn list_all(&self) -> Result<Vec<ItemRecord>, StoreError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM items ORDER BY priority DESC, next_review_date ASC, id ASC",
            COLUMNS
        );
        Self::query_records(&conn, &sql, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::{EnrichmentPayload, Example};
    use tempfile::TempDir;

    fn day(offset: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .checked_add_days(chrono::Days::new(offset))
            .unwrap()
    }

    #[test]
    fn test_insert_defaults_and_duplicate() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let item = store.insert("serendipity", "意外发现珍宝的运气", day(1)).unwrap();

        let loaded = store.get_by_id(item.id).unwrap().unwrap();
        assert_eq!(loaded, item);
        assert_eq!(loaded.ease, INITIAL_EASE);
        assert_eq!(loaded.next_review_date, day(1));

        let err = store.insert("serendipity", "again", day(2)).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey(ref w) if w == "serendipity"));
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        assert!(store.get_by_id(99).unwrap().is_none());
    }

    #[test]
    fn test_query_due_ordering_and_limit() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let a = store.insert("a", "1", day(3)).unwrap();
        let b = store.insert("b", "2", day(1)).unwrap();
        let c = store.insert("c", "3", day(2)).unwrap();
        let d = store.insert("d", "4", day(9)).unwrap();

        let bump = ItemUpdate { priority: Some(2), ..Default::default() };
        store.update_fields(a.id, &bump).unwrap();
        store.update_fields(d.id, &bump).unwrap();

        let due = store.query_due(day(5), 10).unwrap();
        let ids: Vec<i64> = due.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);

        let limited = store.query_due(day(5), 1).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, a.id);

        assert!(store.query_due(day(0), 10).unwrap().is_empty());

        let all: Vec<i64> = store.list_all().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(all, vec![a.id, d.id, b.id, c.id]);
    }

    #[test]
    fn test_partial_update_touches_named_fields_only() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let item = store.insert("ubiquitous", "无处不在的", day(1)).unwrap();

        let payload = EnrichmentPayload {
            word: "ubiquitous".into(),
            meaning: "无处不在的".into(),
            examples: vec![Example {
                sentence: "Phones are ubiquitous.".into(),
                paraphrase: "手机随处可见。".into(),
                note: String::new(),
            }],
        };
        store
            .update_fields(item.id, &ItemUpdate::enrichment(EnrichmentData::Examples(payload.clone())))
            .unwrap();

        let loaded = store.get_by_id(item.id).unwrap().unwrap();
        assert_eq!(loaded.enrichment, Some(EnrichmentData::Examples(payload)));
        assert_eq!(loaded.recall_state(), item.recall_state());
        assert_eq!(loaded.priority, 0);
        assert!(loaded.last_review_date.is_none());
    }

    #[test]
    fn test_update_missing_id() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let update = ItemUpdate { priority: Some(1), ..Default::default() };
        assert!(matches!(store.update_fields(7, &update), Err(StoreError::NotFound(7))));
        assert!(matches!(
            store.update_fields(7, &ItemUpdate::default()),
            Err(StoreError::NotFound(7))
        ));
    }

    #[test]
    fn test_negative_interval_is_corruption() {
        let store = SqliteItemStore::open_in_memory().unwrap();
        let item = store.insert("broken", "坏的", day(1)).unwrap();
        store
            .conn()
            .unwrap()
            .execute("UPDATE items SET interval = -3 WHERE id = ?1", params![item.id])
            .unwrap();

        let err = store.get_by_id(item.id).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted { id, .. } if id == item.id));
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("lexi.db");

        let id = {
            let store = SqliteItemStore::open(&path).unwrap();
            let item = store.insert("persist", "持久", day(1)).unwrap();
            store
                .update_fields(item.id, &ItemUpdate { ease: Some(1.46), ..Default::default() })
                .unwrap();
            item.id
        };

        let store = SqliteItemStore::open(&path).unwrap();
        let loaded = store.get_by_id(id).unwrap().unwrap();
        assert_eq!(loaded.word, "persist");
        assert_eq!(loaded.ease, 1.46);
    }
}
