//! Chat orchestration boundary.
//!
//! The remote backend is tried first under a deadline. On error or timeout
//! the local pattern bot answers. Already-resolved context facts supplied by
//! the caller are appended to the reply; nothing here fetches them.

use crate::dialogue::ResponseDetails;
use crate::error::{ParleyError, Result};
use crate::table::SharedRules;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Remote chat service the orchestrator races against its deadline.
#[async_trait]
pub trait RemoteBackend: Send + Sync {
    async fn reply(&self, input: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Backend for running without a remote service.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineBackend;

#[async_trait]
impl RemoteBackend for OfflineBackend {
    async fn reply(&self, _input: &str) -> Result<String> {
        Err(ParleyError::Remote("no remote backend configured".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub reply: String,
    pub source: ReplySource,
    /// Present when the local engine produced the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ResponseDetails>,
}

pub struct ChatOrchestrator {
    rules: Arc<SharedRules>,
    remote: Box<dyn RemoteBackend>,
    timeout: Duration,
}

impl ChatOrchestrator {
    pub fn new(rules: Arc<SharedRules>, remote: Box<dyn RemoteBackend>, timeout: Duration) -> Self {
        Self {
            rules,
            remote,
            timeout,
        }
    }

    pub fn offline(rules: Arc<SharedRules>) -> Self {
        Self::new(rules, Box::new(OfflineBackend), Duration::ZERO)
    }

    pub fn rules(&self) -> &Arc<SharedRules> {
        &self.rules
    }

    pub async fn respond(&self, input: &str, context: &[String]) -> ChatTurn {
        let mut turn = match tokio::time::timeout(self.timeout, self.remote.reply(input)).await {
            Ok(Ok(reply)) => {
                debug!(backend = self.remote.name(), "remote reply");
                ChatTurn {
                    reply,
                    source: ReplySource::Remote,
                    details: None,
                }
            }
            Ok(Err(e)) => {
                warn!(backend = self.remote.name(), error = %e, "remote failed, answering locally");
                self.local(input)
            }
            Err(_) => {
                warn!(
                    backend = self.remote.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "remote timed out, answering locally"
                );
                self.local(input)
            }
        };

        append_context(&mut turn.reply, context);
        turn
    }

    /// Local pattern bot reply against the current table snapshot.
    pub fn local(&self, input: &str) -> ChatTurn {
        let rules = self.rules.snapshot();
        let response = rules.bot.get_response(input);
        ChatTurn {
            reply: response.response,
            source: ReplySource::Local,
            details: Some(response.details),
        }
    }
}

fn append_context(reply: &mut String, context: &[String]) {
    for fact in context.iter().map(|f| f.trim()).filter(|f| !f.is_empty()) {
        if !reply.is_empty() {
            reply.push('\n');
        }
        reply.push_str(fact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::TemplateSelector;

    struct EchoBackend;

    #[async_trait]
    impl RemoteBackend for EchoBackend {
        async fn reply(&self, input: &str) -> Result<String> {
            Ok(format!("remote: {}", input))
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl RemoteBackend for SlowBackend {
        async fn reply(&self, _input: &str) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok("too late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn rules() -> Arc<SharedRules> {
        Arc::new(SharedRules::builtin(TemplateSelector::Fixed { index: 0 }).unwrap())
    }

    #[tokio::test]
    async fn test_remote_wins_when_fast() {
        let o = ChatOrchestrator::new(rules(), Box::new(EchoBackend), Duration::from_secs(1));
        let turn = o.respond("hello", &[]).await;
        assert_eq!(turn.source, ReplySource::Remote);
        assert_eq!(turn.reply, "remote: hello");
        assert!(turn.details.is_none());
    }

    #[tokio::test]
    async fn test_remote_error_falls_back() {
        let o = ChatOrchestrator::offline(rules());
        let turn = o.respond("hello", &[]).await;
        assert_eq!(turn.source, ReplySource::Local);
        assert_eq!(turn.reply, "Hello!");
        assert!(turn.details.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let o = ChatOrchestrator::new(rules(), Box::new(SlowBackend), Duration::from_millis(50));
        let turn = o.respond("hello", &[]).await;
        assert_eq!(turn.source, ReplySource::Local);
    }

    #[tokio::test]
    async fn test_context_appended() {
        let o = ChatOrchestrator::offline(rules());
        let context = vec!["Nearest shelter: 12 Main St.".to_string(), "  ".to_string()];
        let turn = o.respond("hello", &context).await;
        assert_eq!(turn.reply, "Hello!\nNearest shelter: 12 Main St.");
    }
}
