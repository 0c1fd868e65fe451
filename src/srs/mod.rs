//! 间隔重复核心：条目模型、Recall Model（SM-2）、到期选择

pub mod item;
pub mod recall;
pub mod selector;

pub use item::{ItemId, ItemRecord, RecallState, INITIAL_EASE, MIN_EASE};
pub use recall::{next_ease, update, InvalidQuality, Quality, PASS_THRESHOLD};
pub use selector::{review_order, select_due, DueSelector};
