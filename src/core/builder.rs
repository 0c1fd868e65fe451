//! 应用构建器：按配置一次性构造存储、LLM 客户端与例句补充器
//!
//! 所有协作方在进程启动时构造，以 Arc 注入复习会话；没有全局客户端状态。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::enrich::{Enricher, LlmEnricher, NoopEnricher};
use crate::llm::{create_deepseek_client, LlmClient, OpenAiClient};
use crate::review::SessionOptions;
use crate::store::{ItemStore, SqliteItemStore, StoreError};

/// 根据配置与环境变量选择 LLM 后端（DeepSeek / OpenAI 兼容）；没有 API Key 时返回 None
pub(crate) fn create_llm_from_config(cfg: &AppConfig) -> Option<Arc<dyn LlmClient>> {
    let provider = cfg.llm.provider.to_lowercase();
    let deepseek_key = std::env::var("DEEPSEEK_API_KEY").ok();
    let openai_key = std::env::var("OPENAI_API_KEY").ok();

    // 有 DeepSeek Key，或配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点
    let deepseek_key = deepseek_key.or_else(|| {
        if provider == "deepseek" {
            openai_key.clone()
        } else {
            None
        }
    });

    if let Some(key) = deepseek_key {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| cfg.llm.model.clone());
        tracing::info!("Using DeepSeek LLM ({})", model);
        return Some(Arc::new(create_deepseek_client(Some(&model), &key)));
    }

    if let Some(key) = openai_key {
        let model = cfg
            .llm
            .openai
            .model
            .clone()
            .unwrap_or_else(|| "gpt-4o-mini".to_string());
        tracing::info!("Using OpenAI LLM ({})", model);
        return Some(Arc::new(OpenAiClient::new(
            cfg.llm.base_url.as_deref(),
            &model,
            &key,
        )));
    }

    tracing::debug!("No LLM API key set, enrichment disabled");
    None
}

pub struct AppBuilder {
    config: AppConfig,
    db_path: PathBuf,
}

impl AppBuilder {
    pub fn new(config: AppConfig) -> Self {
        let db_path = config.app.db_path.clone();
        Self { config, db_path }
    }

    /// 覆盖配置中的数据库路径（命令行 --db）
    pub fn with_db_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.db_path = path;
        }
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn build_store(&self) -> Result<Arc<dyn ItemStore>, StoreError> {
        Ok(Arc::new(SqliteItemStore::open(&self.db_path)?))
    }

    pub fn build_llm(&self) -> Option<Arc<dyn LlmClient>> {
        create_llm_from_config(&self.config)
    }

    /// 例句补充器：配置关闭或没有可用 LLM 时为 NoopEnricher
    pub fn build_enricher(&self) -> Arc<dyn Enricher> {
        if !self.config.enrichment.enabled {
            return Arc::new(NoopEnricher);
        }
        match self.build_llm() {
            Some(llm) => self.enricher_with(llm),
            None => Arc::new(NoopEnricher),
        }
    }

    pub(crate) fn enricher_with(&self, llm: Arc<dyn LlmClient>) -> Arc<dyn Enricher> {
        let timeout = Duration::from_secs(self.config.llm.timeouts.request);
        let mut enricher = LlmEnricher::new(llm, timeout);
        if let Some(ref template) = self.config.enrichment.prompt_template {
            enricher = enricher.with_prompt_template(template.clone());
        }
        Arc::new(enricher)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            example_count: self.config.enrichment.example_count,
            background_enrichment: self.config.enrichment.background,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_enrichment_is_noop() {
        let mut config = AppConfig::default();
        config.enrichment.enabled = false;
        assert!(!AppBuilder::new(config).build_enricher().enabled());
    }

    #[test]
    fn test_enricher_with_llm_is_enabled() {
        let builder = AppBuilder::new(AppConfig::default());
        let enricher = builder.enricher_with(Arc::new(MockLlmClient::replying("{}")));
        assert!(enricher.enabled());
    }

    #[test]
    fn test_db_path_override_and_options() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("words.db");

        let mut config = AppConfig::default();
        config.enrichment.example_count = 3;
        config.enrichment.background = true;
        let builder = AppBuilder::new(config).with_db_path(Some(path.clone()));

        assert_eq!(builder.db_path(), path.as_path());
        let store = builder.build_store().unwrap();
        assert!(store.list_all().unwrap().is_empty());
        assert!(path.exists());

        let options = builder.session_options();
        assert_eq!(options.example_count, 3);
        assert!(options.background_enrichment);
    }
}
