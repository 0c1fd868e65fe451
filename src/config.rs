//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `LEXI__*` 覆盖（双下划线表示嵌套，如 `LEXI__ENRICHMENT__EXAMPLE_COUNT=3`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::enrich::DEFAULT_EXAMPLE_COUNT;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub enrichment: EnrichmentSection,
}

/// [app] 段：数据库路径、每次复习条数、默认日志级别
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// RUST_LOG 未设置时使用
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("lexi.db")
}

fn default_batch_size() -> usize {
    10
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            batch_size: default_batch_size(),
            log_level: default_log_level(),
        }
    }
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai；最终由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

fn default_provider() -> String {
    "deepseek".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
        }
    }
}

/// [enrichment] 段：答错后的例句补充
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentSection {
    #[serde(default = "default_enrichment_enabled")]
    pub enabled: bool,
    #[serde(default = "default_example_count")]
    pub example_count: usize,
    /// 后台执行补充，不阻塞下一条
    #[serde(default)]
    pub background: bool,
    /// 自定义 prompt 模板，占位符 {word} {meaning} {count} {schema}
    pub prompt_template: Option<String>,
}

fn default_enrichment_enabled() -> bool {
    true
}

fn default_example_count() -> usize {
    DEFAULT_EXAMPLE_COUNT
}

impl Default for EnrichmentSection {
    fn default() -> Self {
        Self {
            enabled: default_enrichment_enabled(),
            example_count: default_example_count(),
            background: false,
            prompt_template: None,
        }
    }
}

/// 从 config 目录加载配置，环境变量 LEXI__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 LEXI__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LEXI")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
