//! 单词条目：记忆项数据模型与调度状态
//!
//! 每个单词一条记录。调度字段（repetition_count / ease / interval / priority / 复习日期）只由复习会话更新，
//! enrichment 只由例句补充步骤更新；本模块不负责删除。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::enrich::EnrichmentData;

/// 新条目的初始 ease
pub const INITIAL_EASE: f64 = 2.5;

/// ease 下限，低于此值的记录视为损坏
pub const MIN_EASE: f64 = 1.3;

/// 存储层分配的条目 ID
pub type ItemId = i64;

/// Recall Model 的输入与输出：连续答对次数、ease、间隔天数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecallState {
    pub repetition_count: u32,
    pub ease: f64,
    pub interval: u32,
}

impl RecallState {
    pub fn initial() -> Self {
        Self {
            repetition_count: 0,
            ease: INITIAL_EASE,
            interval: 1,
        }
    }

    /// 校验不变量：ease 有限且 ≥ 1.3，interval ≥ 1
    pub fn validate(&self) -> Result<(), String> {
        if !self.ease.is_finite() || self.ease < MIN_EASE {
            return Err(format!("ease {} is below the minimum {}", self.ease, MIN_EASE));
        }
        if self.interval < 1 {
            return Err(format!("interval {} must be at least 1 day", self.interval));
        }
        Ok(())
    }
}

impl Default for RecallState {
    fn default() -> Self {
        Self::initial()
    }
}

/// 单词记录（word 精确字符串唯一，不做大小写归一）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: ItemId,
    pub word: String,
    /// 参考释义：既是「正确答案」，也是例句补充的输入
    pub meaning: String,
    pub repetition_count: u32,
    pub ease: f64,
    pub interval: u32,
    /// 与到期日无关的紧迫度：答错 +2，答对 -1（不低于 0）
    pub priority: u32,
    pub next_review_date: NaiveDate,
    pub last_review_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentData>,
}

impl ItemRecord {
    /// 首次插入时的记录：当天即到期
    pub fn new(id: ItemId, word: impl Into<String>, meaning: impl Into<String>, today: NaiveDate) -> Self {
        let state = RecallState::initial();
        Self {
            id,
            word: word.into(),
            meaning: meaning.into(),
            repetition_count: state.repetition_count,
            ease: state.ease,
            interval: state.interval,
            priority: 0,
            next_review_date: today,
            last_review_date: None,
            enrichment: None,
        }
    }

    pub fn recall_state(&self) -> RecallState {
        RecallState {
            repetition_count: self.repetition_count,
            ease: self.ease,
            interval: self.interval,
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.next_review_date <= today
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_new_item_defaults() {
        let item = ItemRecord::new(1, "ephemeral", "短暂的", day(10));
        assert_eq!(item.repetition_count, 0);
        assert_eq!(item.ease, 2.5);
        assert_eq!(item.interval, 1);
        assert_eq!(item.priority, 0);
        assert_eq!(item.next_review_date, day(10));
        assert!(item.last_review_date.is_none());
        assert!(item.enrichment.is_none());
        assert!(item.is_due(day(10)));
        assert!(!item.is_due(day(9)));
    }

    #[test]
    fn test_validate_rejects_corrupted_state() {
        assert!(RecallState::initial().validate().is_ok());

        let low_ease = RecallState { ease: 1.0, ..RecallState::initial() };
        assert!(low_ease.validate().is_err());

        let nan_ease = RecallState { ease: f64::NAN, ..RecallState::initial() };
        assert!(nan_ease.validate().is_err());

        let zero_interval = RecallState { interval: 0, ..RecallState::initial() };
        assert!(zero_interval.validate().is_err());
    }
}
