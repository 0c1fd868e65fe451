//! LlmEnricher：通过 LLM 生成例句
//!
//! 持有注入的 LlmClient 与 prompt 模板；单次调用受超时约束。
//! 不重试、不限流：失败即返回 Failure，由会话记录日志后继续。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{
    parse_enrichment, payload_schema_json, EnrichError, Enricher, EnrichmentOutcome,
    EnrichmentRequest,
};
use crate::llm::{LlmClient, Message};

const SYSTEM_PROMPT: &str =
    "You are a vocabulary tutor. Reply with a single JSON object and nothing else.";

/// 默认模板，占位符：{word} {meaning} {count} {schema}
pub const DEFAULT_PROMPT_TEMPLATE: &str = r#"The learner failed to recall the word "{word}" (meaning: {meaning}).
Write {count} short, natural example sentences that use "{word}" in this sense.
For each example give the sentence, a paraphrase or translation of the sentence in the language of the meaning, and an optional usage note.

Answer with JSON matching this schema:
{schema}"#;

pub struct LlmEnricher {
    llm: Arc<dyn LlmClient>,
    prompt_template: String,
    timeout: Duration,
}

impl LlmEnricher {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            llm,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            timeout,
        }
    }

    pub fn with_prompt_template(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    fn build_prompt(&self, request: &EnrichmentRequest) -> String {
        self.prompt_template
            .replace("{word}", &request.word)
            .replace("{meaning}", &request.meaning)
            .replace("{count}", &request.example_count.to_string())
            .replace("{schema}", &payload_schema_json())
    }
}

#[async_trait]
impl Enricher for LlmEnricher {
    async fn enrich(&self, request: &EnrichmentRequest) -> EnrichmentOutcome {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(self.build_prompt(request)),
        ];

        match tokio::time::timeout(self.timeout, self.llm.complete(&messages)).await {
            Err(_) => EnrichmentOutcome::Failure(EnrichError::Timeout(self.timeout.as_secs())),
            Ok(Err(e)) => EnrichmentOutcome::Failure(EnrichError::Llm(e)),
            Ok(Ok(text)) => parse_enrichment(&text, request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn request() -> EnrichmentRequest {
        EnrichmentRequest::new("laconic", "简洁的", 3)
    }

    #[tokio::test]
    async fn test_structured_reply() {
        let llm = Arc::new(MockLlmClient::replying(
            r#"{"word": "laconic", "meaning": "简洁的", "examples": [{"sentence": "A laconic reply.", "paraphrase": "简短的回答。", "note": ""}]}"#,
        ));
        let enricher = LlmEnricher::new(llm.clone(), Duration::from_secs(5));

        let outcome = enricher.enrich(&request()).await;
        assert!(matches!(outcome, EnrichmentOutcome::Structured(ref p) if p.examples.len() == 1));
        assert_eq!(llm.calls(), 1);

        let prompt = llm.last_user_message().unwrap();
        assert!(prompt.contains("\"laconic\""));
        assert!(prompt.contains("简洁的"));
        assert!(prompt.contains("Write 3 short"));
        assert!(prompt.contains("\"examples\""));
    }

    #[tokio::test]
    async fn test_llm_error_is_failure() {
        let llm = Arc::new(MockLlmClient::failing("401 unauthorized"));
        let enricher = LlmEnricher::new(llm, Duration::from_secs(5));
        assert_eq!(
            enricher.enrich(&request()).await,
            EnrichmentOutcome::Failure(EnrichError::Llm("401 unauthorized".into()))
        );
    }

    #[tokio::test]
    async fn test_slow_reply_times_out() {
        let llm = Arc::new(
            MockLlmClient::replying("{}").with_delay(Duration::from_millis(500)),
        );
        let enricher = LlmEnricher::new(llm, Duration::from_millis(20));
        assert!(matches!(
            enricher.enrich(&request()).await,
            EnrichmentOutcome::Failure(EnrichError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_template() {
        let llm = Arc::new(MockLlmClient::replying("not json"));
        let enricher = LlmEnricher::new(llm.clone(), Duration::from_secs(5))
            .with_prompt_template("{word}|{meaning}|{count}");

        let outcome = enricher.enrich(&request()).await;
        assert_eq!(
            outcome,
            EnrichmentOutcome::RawFallback {
                raw_text: "not json".into()
            }
        );
        assert_eq!(llm.last_user_message().unwrap(), "laconic|简洁的|3");
    }
}
