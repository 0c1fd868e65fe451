//! 列表与详情渲染（lexi list / lexi show）

use crossterm::style::Stylize;

use crate::enrich::EnrichmentData;
use crate::srs::ItemRecord;

/// 单行摘要：ID、单词、释义、调度字段
pub fn render_item_line(item: &ItemRecord) -> String {
    let last = item
        .last_review_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4}  {:<20} {:<24} 下次 {}  间隔 {:>3}d  ease {:.2}  连对 {}  优先级 {}  上次 {}",
        item.id,
        item.word,
        item.meaning,
        item.next_review_date,
        item.interval,
        item.ease,
        item.repetition_count,
        item.priority,
        last
    )
}

pub fn render_items_json(items: &[ItemRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(items)
}

/// 详情：摘要 + 例句补充
pub fn render_item_detail(item: &ItemRecord) -> String {
    let mut out = format!(
        "{}  {}\n{}\n",
        item.word.as_str().bold().cyan(),
        format!("#{}", item.id).dark_grey(),
        item.meaning
    );
    out.push_str(&format!(
        "下次复习 {}，间隔 {} 天，ease {:.2}，连续答对 {}，优先级 {}\n",
        item.next_review_date, item.interval, item.ease, item.repetition_count, item.priority
    ));

    match &item.enrichment {
        None => {}
        Some(EnrichmentData::Examples(payload)) => {
            out.push_str("\n例句:\n");
            for (i, example) in payload.examples.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, example.sentence));
                if !example.paraphrase.is_empty() {
                    out.push_str(&format!("     {}\n", example.paraphrase));
                }
                if !example.note.is_empty() {
                    out.push_str(&format!("     {}\n", example.note.as_str().dark_grey()));
                }
            }
        }
        Some(EnrichmentData::Raw { raw_text, .. }) => {
            out.push_str("\n补充（未解析）:\n");
            out.push_str(raw_text);
            out.push('\n');
        }
    }
    out
}
