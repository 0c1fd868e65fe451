//! Lexi - Rust 背单词工具
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、应用构建器（存储 / LLM / 补充器注入）
//! - **enrich**: 答错后的例句补充（LLM 生成，尽力而为）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志
//! - **review**: 答案评分、交互协作方、复习会话控制器
//! - **srs**: 条目模型、SM-2 Recall Model、到期选择
//! - **store**: 单词存储（SQLite / 内存）
//! - **ui**: 终端问答与列表渲染

pub mod config;
pub mod core;
pub mod enrich;
pub mod llm;
pub mod observability;
pub mod review;
pub mod srs;
pub mod store;
pub mod ui;

pub use review::{ReviewSession, SessionOptions, SessionReport};
pub use srs::{ItemRecord, Quality};
