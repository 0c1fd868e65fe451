//! 复习会话控制器
//!
//! 对 Due Selector 给出的一批条目依次执行：
//! Presenting（展示并读答案）→ Grading（评分）→ Updating（Recall Model + 优先级，单次原子写回）
//! → EnrichingOnLapse（仅答错时，请求例句补充）→ 下一条，直到批次结束。
//!
//! 条目之间不共享状态；中途退出时已写回的更新保留，未处理的条目留待下次。
//! 例句补充失败不会中断会话；只有数据完整性错误与存储错误会终止本次运行。

use std::fmt;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tokio::task::JoinHandle;

use super::grading::{grade_answer, Verdict};
use super::prompt::{Feedback, Prompter};
use crate::core::ReviewError;
use crate::enrich::{Enricher, EnrichmentOutcome, EnrichmentRequest, DEFAULT_EXAMPLE_COUNT};
use crate::srs::{recall, DueSelector, ItemId, ItemRecord, Quality, RecallState};
use crate::store::{ItemStore, ItemUpdate, StoreError};

/// 答错时 priority 增加量
pub const LAPSE_PRIORITY_BOOST: u32 = 2;
/// 答对时 priority 减少量（不低于 0）
pub const SUCCESS_PRIORITY_DECAY: u32 = 1;

/// 会话中单个条目所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Presenting,
    Grading,
    Updating,
    EnrichingOnLapse,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Presenting => "presenting",
            Phase::Grading => "grading",
            Phase::Updating => "updating",
            Phase::EnrichingOnLapse => "enriching",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// 每次补充请求的例句数
    pub example_count: usize,
    /// 为 true 时补充在后台任务中执行，不阻塞下一条；会话结束前统一等待
    pub background_enrichment: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            example_count: DEFAULT_EXAMPLE_COUNT,
            background_enrichment: false,
        }
    }
}

/// 会话结束信号
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    pub due: usize,
    pub reviewed: usize,
    pub correct: usize,
    pub lapses: usize,
    pub enriched: usize,
    /// 输入提前结束，批次未处理完
    pub cancelled: bool,
}

/// 一次复习算出的新状态（尚未写回）
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewPlan {
    pub verdict: Verdict,
    pub quality: Quality,
    pub state: RecallState,
    pub priority: u32,
    pub next_review_date: NaiveDate,
}

impl ReviewPlan {
    pub fn to_update(&self, reviewed_on: NaiveDate) -> ItemUpdate {
        ItemUpdate::schedule(self.state, self.priority, self.next_review_date, reviewed_on)
    }
}

/// 可调度的最晚日期；超出时截断（四位年份保证 ISO 文本顺序即日期顺序）
pub fn latest_review_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

pub fn adjust_priority(priority: u32, quality: Quality) -> u32 {
    if quality.is_lapse() {
        priority.saturating_add(LAPSE_PRIORITY_BOOST)
    } else {
        priority.saturating_sub(SUCCESS_PRIORITY_DECAY)
    }
}

/// 计算复习结果；记录本身违反不变量时返回 Precondition，不产出看似合理的错误调度
pub fn plan_review(
    item: &ItemRecord,
    verdict: Verdict,
    today: NaiveDate,
) -> Result<ReviewPlan, ReviewError> {
    let current = item.recall_state();
    current.validate().map_err(|reason| ReviewError::Precondition {
        word: item.word.clone(),
        reason,
    })?;

    let quality = verdict.quality();
    let state = recall::update(current, quality);
    let latest = latest_review_date();
    let next_review_date = today
        .checked_add_days(Days::new(u64::from(state.interval)))
        .filter(|date| *date <= latest)
        .unwrap_or(latest);

    Ok(ReviewPlan {
        verdict,
        quality,
        state,
        priority: adjust_priority(item.priority, quality),
        next_review_date,
    })
}

/// 请求补充并只写 enrichment 字段；返回是否写入了数据
async fn enrich_and_store(
    enricher: Arc<dyn Enricher>,
    store: Arc<dyn ItemStore>,
    id: ItemId,
    request: EnrichmentRequest,
) -> Result<bool, StoreError> {
    let outcome = enricher.enrich(&request).await;
    match &outcome {
        EnrichmentOutcome::Failure(e) => {
            tracing::warn!("Enrichment for '{}' failed, skipping: {}", request.word, e);
            return Ok(false);
        }
        EnrichmentOutcome::RawFallback { .. } => {
            tracing::warn!("Enrichment reply for '{}' is not structured, storing raw text", request.word);
        }
        EnrichmentOutcome::Structured(payload) => {
            tracing::debug!("Enrichment for '{}' returned {} examples", request.word, payload.examples.len());
        }
    }

    match outcome.into_data(&request) {
        Some(data) => {
            store.update_fields(id, &ItemUpdate::enrichment(data))?;
            tracing::info!("Stored enrichment for '{}'", request.word);
            Ok(true)
        }
        None => Ok(false),
    }
}

type PendingEnrichment = (String, JoinHandle<Result<bool, StoreError>>);

/// 等待全部后台补充任务；某个任务写回失败时仍等完其余任务，返回第一个错误
async fn join_enrichments(
    pending: Vec<PendingEnrichment>,
    report: &mut SessionReport,
) -> Result<(), ReviewError> {
    let mut first_error = None;
    for (word, handle) in pending {
        match handle.await {
            Ok(Ok(true)) => report.enriched += 1,
            Ok(Ok(false)) => {}
            Ok(Err(source)) => {
                tracing::warn!("Storing enrichment for '{}' failed: {}", word, source);
                if first_error.is_none() {
                    first_error = Some(ReviewError::Store {
                        word,
                        phase: Phase::EnrichingOnLapse,
                        source,
                    });
                }
            }
            Err(e) => tracing::warn!("Enrichment task for '{}' did not finish: {}", word, e),
        }
    }
    first_error.map_or(Ok(()), Err)
}

/// 复习会话：存储与补充器在构造时注入
pub struct ReviewSession<P> {
    store: Arc<dyn ItemStore>,
    selector: DueSelector,
    enricher: Arc<dyn Enricher>,
    prompter: P,
    options: SessionOptions,
}

impl<P: Prompter> ReviewSession<P> {
    pub fn new(
        store: Arc<dyn ItemStore>,
        enricher: Arc<dyn Enricher>,
        prompter: P,
        options: SessionOptions,
    ) -> Self {
        Self {
            selector: DueSelector::new(store.clone()),
            store,
            enricher,
            prompter,
            options,
        }
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn into_prompter(self) -> P {
        self.prompter
    }

    /// 执行一次复习：最多 limit 条到期条目
    pub async fn run(&mut self, today: NaiveDate, limit: usize) -> Result<SessionReport, ReviewError> {
        let batch = self
            .selector
            .select(today, limit)
            .map_err(ReviewError::Selection)?;

        let mut report = SessionReport {
            due: batch.len(),
            ..Default::default()
        };

        if batch.is_empty() {
            tracing::info!("Nothing due on {}", today);
            self.prompter.show_empty()?;
            return Ok(report);
        }

        tracing::info!("Review session started: {} items due on {}", batch.len(), today);
        let mut pending = Vec::new();
        let reviewed = self.review_batch(&batch, today, &mut report, &mut pending).await;
        // 出错时也要等后台补充写完，再返回第一个错误
        let joined = join_enrichments(pending, &mut report).await;
        reviewed?;
        joined?;

        tracing::info!(
            "Review session finished: {} reviewed, {} correct, {} lapses, {} enriched",
            report.reviewed,
            report.correct,
            report.lapses,
            report.enriched
        );
        self.prompter.show_done(&report)?;
        Ok(report)
    }

    /// 逐条处理批次；后台补充任务放入 pending，由调用方统一等待
    async fn review_batch(
        &mut self,
        batch: &[ItemRecord],
        today: NaiveDate,
        report: &mut SessionReport,
        pending: &mut Vec<PendingEnrichment>,
    ) -> Result<(), ReviewError> {
        let total = batch.len();
        for (index, item) in batch.iter().enumerate() {
            tracing::debug!("[{}] {}", Phase::Presenting, item.word);
            let answer = match self.prompter.ask(&item.word, index + 1, total).await? {
                Some(answer) => answer,
                None => {
                    tracing::info!("Input closed after {} of {} items", report.reviewed, total);
                    report.cancelled = true;
                    return Ok(());
                }
            };

            tracing::debug!("[{}] {}", Phase::Grading, item.word);
            let verdict = grade_answer(&answer, &item.meaning);

            tracing::debug!("[{}] {}", Phase::Updating, item.word);
            let plan = plan_review(item, verdict, today)?;
            self.store
                .update_fields(item.id, &plan.to_update(today))
                .map_err(|source| ReviewError::Store {
                    word: item.word.clone(),
                    phase: Phase::Updating,
                    source,
                })?;
            report.reviewed += 1;

            self.prompter.show_feedback(&Feedback {
                word: item.word.clone(),
                meaning: item.meaning.clone(),
                verdict,
                interval: plan.state.interval,
                next_review_date: plan.next_review_date,
            })?;

            if !plan.quality.is_lapse() {
                report.correct += 1;
                continue;
            }
            report.lapses += 1;

            if !self.enricher.enabled() {
                continue;
            }

            tracing::debug!("[{}] {}", Phase::EnrichingOnLapse, item.word);
            let request = EnrichmentRequest::new(&item.word, &item.meaning, self.options.example_count);
            let task = enrich_and_store(self.enricher.clone(), self.store.clone(), item.id, request);

            if self.options.background_enrichment {
                pending.push((item.word.clone(), tokio::spawn(task)));
            } else {
                let stored = task.await.map_err(|source| ReviewError::Store {
                    word: item.word.clone(),
                    phase: Phase::EnrichingOnLapse,
                    source,
                })?;
                if stored {
                    report.enriched += 1;
                }
            }
        }
        Ok(())
    }
}
