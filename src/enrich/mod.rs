//! 例句补充：答错后为单词获取例句，尽力而为
//!
//! 外部生成服务的回复在边界处一次性归类为 EnrichmentOutcome：
//! - Structured：解析成功的结构化例句
//! - RawFallback：无法解析，保留原文（连同单词与释义一起存储，不阻塞学习）
//! - Failure：调用失败或超时，记录日志后跳过
//!
//! 未配置 API Key 时使用 NoopEnricher，会话直接跳过补充步骤。

pub mod generator;
pub mod parse;
pub mod schema;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use generator::{LlmEnricher, DEFAULT_PROMPT_TEMPLATE};
pub use parse::parse_enrichment;
pub use schema::payload_schema_json;

/// 默认每次请求的例句数
pub const DEFAULT_EXAMPLE_COUNT: usize = 5;

/// 单条例句
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Example {
    /// 使用该单词的例句
    pub sentence: String,
    /// 例句的释义或翻译
    #[serde(default)]
    pub paraphrase: String,
    /// 用法说明（搭配、语域等），可为空
    #[serde(default)]
    pub note: String,
}

/// 结构化例句数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnrichmentPayload {
    /// 单词（缺省时由请求补齐）
    #[serde(default)]
    pub word: String,
    /// 释义（缺省时由请求补齐）
    #[serde(default)]
    pub meaning: String,
    pub examples: Vec<Example>,
}

/// 存入记录的补充数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnrichmentData {
    Examples(EnrichmentPayload),
    Raw {
        word: String,
        meaning: String,
        raw_text: String,
    },
}

/// 补充请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub word: String,
    pub meaning: String,
    pub example_count: usize,
}

impl EnrichmentRequest {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>, example_count: usize) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            example_count,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Enrichment timed out after {0}s")]
    Timeout(u64),

    #[error("Enrichment is not configured")]
    Disabled,
}

/// 一次补充调用的结果
#[derive(Debug, Clone, PartialEq)]
pub enum EnrichmentOutcome {
    Structured(EnrichmentPayload),
    RawFallback { raw_text: String },
    Failure(EnrichError),
}

impl EnrichmentOutcome {
    /// 转为可持久化的数据；Failure 没有可存的内容
    pub fn into_data(self, request: &EnrichmentRequest) -> Option<EnrichmentData> {
        match self {
            Self::Structured(payload) => Some(EnrichmentData::Examples(payload)),
            Self::RawFallback { raw_text } => Some(EnrichmentData::Raw {
                word: request.word.clone(),
                meaning: request.meaning.clone(),
                raw_text,
            }),
            Self::Failure(_) => None,
        }
    }
}

/// 例句补充协作方
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, request: &EnrichmentRequest) -> EnrichmentOutcome;

    /// 是否启用（Noop 实现返回 false，会话据此跳过补充步骤）
    fn enabled(&self) -> bool {
        true
    }
}

/// 空实现：未配置生成服务时使用
#[derive(Debug, Clone, Default)]
pub struct NoopEnricher;

#[async_trait]
impl Enricher for NoopEnricher {
    async fn enrich(&self, _request: &EnrichmentRequest) -> EnrichmentOutcome {
        EnrichmentOutcome::Failure(EnrichError::Disabled)
    }

    fn enabled(&self) -> bool {
        false
    }
}
