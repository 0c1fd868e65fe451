//! 终端问答：逐条展示单词，从 stdin 读一行答案
//!
//! 读取阻塞等待用户输入，没有超时；stdin 关闭（Ctrl-D）时返回 None，会话就此结束。

use std::io::{self, Stdout, Write};

use async_trait::async_trait;
use crossterm::style::Stylize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::review::{Feedback, Prompter, SessionReport, Verdict};

pub struct ConsolePrompter {
    lines: Lines<BufReader<Stdin>>,
    out: Stdout,
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
            out: io::stdout(),
        }
    }
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for ConsolePrompter {
    async fn ask(&mut self, word: &str, position: usize, total: usize) -> io::Result<Option<String>> {
        writeln!(self.out)?;
        writeln!(
            self.out,
            "{} {}",
            format!("[{}/{}]", position, total).dark_grey(),
            word.bold().cyan()
        )?;
        write!(self.out, "{} ", "释义 (直接回车表示不知道) >".dark_grey())?;
        self.out.flush()?;
        self.lines.next_line().await
    }

    fn show_feedback(&mut self, feedback: &Feedback) -> io::Result<()> {
        match feedback.verdict {
            Verdict::Correct => writeln!(self.out, "{}", "✓ 正确".green())?,
            Verdict::Incorrect => writeln!(
                self.out,
                "{} 正确释义: {}",
                "✗ 不对".red(),
                feedback.meaning.as_str().yellow()
            )?,
            Verdict::DontKnow => writeln!(
                self.out,
                "{} 正确释义: {}",
                "… 不知道".yellow(),
                feedback.meaning.as_str().yellow()
            )?,
        }
        writeln!(
            self.out,
            "{}",
            format!(
                "下次复习: {}（{} 天后）",
                feedback.next_review_date, feedback.interval
            )
            .dark_grey()
        )
    }

    fn show_empty(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", "今天没有需要复习的单词。".green())
    }

    fn show_done(&mut self, report: &SessionReport) -> io::Result<()> {
        writeln!(self.out)?;
        let summary = format!(
            "复习完成：{} 个，答对 {} 个，答错 {} 个",
            report.reviewed, report.correct, report.lapses
        );
        if report.cancelled {
            writeln!(self.out, "{}（提前结束，剩余单词留待下次）", summary.bold())
        } else {
            writeln!(self.out, "{}", summary.bold())
        }
    }
}
