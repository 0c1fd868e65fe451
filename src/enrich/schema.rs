//! 例句数据的 JSON Schema（schemars 生成）
//!
//! 拼入 prompt，约束生成服务的输出结构，减少格式错误。

use schemars::schema_for;

use super::EnrichmentPayload;

/// 返回 EnrichmentPayload 的 JSON Schema 字符串
pub fn payload_schema_json() -> String {
    let schema = schema_for!(EnrichmentPayload);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_example_fields() {
        let schema = payload_schema_json();
        for field in ["examples", "sentence", "paraphrase", "note"] {
            assert!(schema.contains(field), "schema missing {}", field);
        }
    }
}
