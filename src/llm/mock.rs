//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 返回预设回复或预设错误，可选延迟以模拟超时；记录调用次数与最后一条 User 消息。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{LlmClient, Message, Role};

/// Mock 客户端
#[derive(Debug)]
pub struct MockLlmClient {
    reply: Result<String, String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_user: Mutex<Option<String>>,
}

impl MockLlmClient {
    /// 每次调用都返回同一段文本
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    /// 每次调用都返回错误
    pub fn failing(error: impl Into<String>) -> Self {
        Self::with_result(Err(error.into()))
    }

    fn with_result(reply: Result<String, String>) -> Self {
        Self {
            reply,
            delay: None,
            calls: AtomicUsize::new(0),
            last_user: Mutex::new(None),
        }
    }

    /// 回复前先等待一段时间
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_message(&self) -> Option<String> {
        self.last_user.lock().ok().and_then(|m| m.clone())
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone());
        if let Ok(mut slot) = self.last_user.lock() {
            *slot = last_user;
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}
