//! 复习会话错误
//!
//! 例句补充失败不在此列（在 EnrichmentOutcome 内消化）；这里只有会终止本次运行的错误，
//! 且都带上正在处理的单词，便于定位。

use thiserror::Error;

use crate::review::Phase;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Failed to select due items: {0}")]
    Selection(#[source] StoreError),

    /// 记录违反不变量（ease < 1.3、interval < 1 等），属于数据完整性问题
    #[error("Integrity violation on '{word}': {reason}")]
    Precondition { word: String, reason: String },

    #[error("Storage failed on '{word}' while {phase}: {source}")]
    Store {
        word: String,
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("Terminal I/O failed: {0}")]
    Input(#[from] std::io::Error),
}
