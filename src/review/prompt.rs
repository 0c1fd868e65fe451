//! 文本交互协作方：展示单词、读取答案、反馈结果
//!
//! 会话只依赖 Prompter trait；终端实现见 ui::ConsolePrompter，ScriptedPrompter 按预设答案作答。

use std::collections::VecDeque;
use std::io;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::grading::Verdict;
use super::session::SessionReport;

/// 单条复习的反馈
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub word: String,
    pub meaning: String,
    pub verdict: Verdict,
    pub interval: u32,
    pub next_review_date: NaiveDate,
}

#[async_trait]
pub trait Prompter: Send {
    /// 展示单词并读取答案；输入结束（EOF）返回 None，会话随之结束
    async fn ask(&mut self, word: &str, position: usize, total: usize) -> io::Result<Option<String>>;

    fn show_feedback(&mut self, feedback: &Feedback) -> io::Result<()>;

    /// 今天没有到期条目
    fn show_empty(&mut self) -> io::Result<()>;

    fn show_done(&mut self, report: &SessionReport) -> io::Result<()>;
}

/// 按顺序给出预设答案，答案用完视为输入结束
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    pub asked: Vec<String>,
    pub feedback: Vec<Feedback>,
    pub empty_shown: bool,
    pub report: Option<SessionReport>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn ask(&mut self, word: &str, _position: usize, _total: usize) -> io::Result<Option<String>> {
        self.asked.push(word.to_string());
        Ok(self.answers.pop_front())
    }

    fn show_feedback(&mut self, feedback: &Feedback) -> io::Result<()> {
        self.feedback.push(feedback.clone());
        Ok(())
    }

    fn show_empty(&mut self) -> io::Result<()> {
        self.empty_shown = true;
        Ok(())
    }

    fn show_done(&mut self, report: &SessionReport) -> io::Result<()> {
        self.report = Some(report.clone());
        Ok(())
    }
}
