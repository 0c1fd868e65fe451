//! 生成服务回复的边界解析
//!
//! 提取 JSON 块（```json ... ``` 或首个 `{` 到最后一个 `}`），按 EnrichmentPayload 反序列化；
//! 失败一律归为 RawFallback，不在别处再猜测回复格式。

use super::{EnrichmentOutcome, EnrichmentPayload, EnrichmentRequest};

fn extract_json_block(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let rest = &text[start + 7..];
        return Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()));
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// 把原始回复归类为 Structured 或 RawFallback
pub fn parse_enrichment(raw: &str, request: &EnrichmentRequest) -> EnrichmentOutcome {
    let trimmed = raw.trim();
    let parsed = extract_json_block(trimmed)
        .and_then(|json| serde_json::from_str::<EnrichmentPayload>(json).ok());

    match parsed {
        Some(mut payload) => {
            if payload.word.trim().is_empty() {
                payload.word = request.word.clone();
            }
            if payload.meaning.trim().is_empty() {
                payload.meaning = request.meaning.clone();
            }
            EnrichmentOutcome::Structured(payload)
        }
        None => EnrichmentOutcome::RawFallback {
            raw_text: trimmed.to_string(),
        },
    }
}
