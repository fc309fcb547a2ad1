//! Chat session state and off-thread reply dispatch.
//!
//! Replies are generated on tokio tasks. Every request carries a ticket
//! stamped with the session epoch; clearing the chat bumps the epoch, so a
//! reply that was still in flight is dropped instead of being shown in the
//! fresh chat.

use crate::engine::generative::GENERATION_FAILED_REPLY;
use crate::engine::ResponseEngine;
use rand::Rng;
use shared::settings::ThinkingDelaySettings;
use shared::ChatHistory;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const TIMEOUT_REPLY: &str = "Entschuldigung, die Antwort hat zu lange gedauert.";
pub const THINKING_PLACEHOLDER: &str = "Ich denke nach...";

/// Identifies one reply request within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    epoch: u64,
    seq: u64,
}

impl RequestTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// A finished reply, still tagged with its request
#[derive(Debug, Clone)]
pub struct Reply {
    pub ticket: RequestTicket,
    pub text: String,
}

pub struct ChatSession {
    history: ChatHistory,
    epoch: u64,
    next_seq: u64,
}

impl ChatSession {
    pub fn new(history: ChatHistory) -> Self {
        Self {
            history,
            epoch: 0,
            next_seq: 0,
        }
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn record_user(&mut self, text: &str) {
        self.history.push_user(text);
    }

    pub fn record_assistant(&mut self, text: &str) {
        self.history.push_assistant(text);
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        let ticket = RequestTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        ticket
    }

    /// Forget the conversation and invalidate outstanding requests.
    pub fn clear(&mut self) {
        self.history.clear();
        self.epoch += 1;
    }

    /// Record `reply` if it belongs to the current conversation.
    /// Returns `false` for replies that predate a `clear()`.
    pub fn accept(&mut self, reply: &Reply) -> bool {
        if reply.ticket.epoch != self.epoch {
            tracing::debug!(seq = reply.ticket.seq, "dropping reply from cleared chat");
            return false;
        }
        self.history.push_assistant(&reply.text);
        true
    }
}

/// Cosmetic pause before a reply appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThinkingDelay {
    min: Duration,
    max: Duration,
}

impl ThinkingDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        if max < min {
            Self { min: max, max: min }
        } else {
            Self { min, max }
        }
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Uniform sample from `[min, max]`
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rand::thread_rng().gen_range(self.min..=self.max)
    }
}

impl From<&ThinkingDelaySettings> for ThinkingDelay {
    fn from(settings: &ThinkingDelaySettings) -> Self {
        Self::new(
            Duration::from_millis(settings.min_ms),
            Duration::from_millis(settings.max_ms),
        )
    }
}

/// Runs engine calls off the interactive loop
pub struct ReplyDispatcher {
    engine: Arc<dyn ResponseEngine>,
    delay: ThinkingDelay,
    timeout: Option<Duration>,
}

impl ReplyDispatcher {
    pub fn new(engine: Arc<dyn ResponseEngine>) -> Self {
        Self {
            engine,
            delay: ThinkingDelay::none(),
            timeout: None,
        }
    }

    pub fn with_delay(mut self, delay: ThinkingDelay) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Spawn the reply for `text` on the runtime. Must be called from
    /// within a tokio runtime.
    pub fn dispatch(
        &self,
        ticket: RequestTicket,
        text: String,
        history: Vec<String>,
    ) -> JoinHandle<Reply> {
        let engine = self.engine.clone();
        let pause = self.delay.sample();
        let timeout = self.timeout;

        tokio::spawn(async move {
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }

            let work = engine.generate(&text, &history);
            let text = match timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(reply) => reply,
                    Err(_) => {
                        tracing::warn!(seq = ticket.seq, "reply timed out after {:?}", limit);
                        TIMEOUT_REPLY.to_string()
                    }
                },
                None => work.await,
            };

            Reply { ticket, text }
        })
    }

    /// Dispatch and wait, turning a panicked task into an apology.
    pub async fn reply(&self, ticket: RequestTicket, text: String, history: Vec<String>) -> Reply {
        match self.dispatch(ticket, text, history).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("error in response generation task: {}", e);
                Reply {
                    ticket,
                    text: GENERATION_FAILED_REPLY.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleBasedEngine;
    use async_trait::async_trait;

    struct SlowEngine(Duration);

    #[async_trait]
    impl ResponseEngine for SlowEngine {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn generate(&self, text: &str, _history: &[String]) -> String {
            tokio::time::sleep(self.0).await;
            format!("langsam: {}", text)
        }
    }

    struct PanickingEngine;

    #[async_trait]
    impl ResponseEngine for PanickingEngine {
        fn name(&self) -> &'static str {
            "panicking"
        }

        async fn generate(&self, _text: &str, _history: &[String]) -> String {
            panic!("engine blew up")
        }
    }

    #[test]
    fn test_tickets_are_sequential() {
        let mut session = ChatSession::new(ChatHistory::bounded(20));
        let a = session.begin_request();
        let b = session.begin_request();
        assert_eq!(a.seq() + 1, b.seq());
    }

    #[test]
    fn test_reply_after_clear_is_rejected() {
        let mut session = ChatSession::new(ChatHistory::bounded(20));
        session.record_user("hallo");
        let ticket = session.begin_request();
        session.clear();

        let stale = Reply {
            ticket,
            text: "zu spät".into(),
        };
        assert!(!session.accept(&stale));
        assert!(session.history().is_empty());

        let fresh = Reply {
            ticket: session.begin_request(),
            text: "pünktlich".into(),
        };
        assert!(session.accept(&fresh));
        assert_eq!(session.history().snapshot(), vec!["Assistent: pünktlich"]);
    }

    #[test]
    fn test_thinking_delay_range() {
        let delay = ThinkingDelay::from(&ThinkingDelaySettings::default());
        for _ in 0..50 {
            let d = delay.sample();
            assert!(d >= Duration::from_millis(500) && d <= Duration::from_millis(2000));
        }
        assert_eq!(ThinkingDelay::none().sample(), Duration::ZERO);
    }

    #[test]
    fn test_thinking_delay_swaps_inverted_bounds() {
        let delay = ThinkingDelay::new(Duration::from_millis(30), Duration::from_millis(10));
        let d = delay.sample();
        assert!(d >= Duration::from_millis(10) && d <= Duration::from_millis(30));
    }

    #[tokio::test]
    async fn test_dispatch_returns_engine_reply() {
        let dispatcher = ReplyDispatcher::new(Arc::new(RuleBasedEngine::with_seed(1)));
        let mut session = ChatSession::new(ChatHistory::bounded(20));
        let ticket = session.begin_request();

        let reply = dispatcher
            .reply(ticket, "was ist python".into(), session.history().snapshot())
            .await;
        assert_eq!(reply.ticket, ticket);
        assert!(reply.text.starts_with("Python ist"));
        assert!(session.accept(&reply));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_apology() {
        let dispatcher = ReplyDispatcher::new(Arc::new(SlowEngine(Duration::from_secs(300))))
            .with_timeout(Some(Duration::from_secs(120)));
        let mut session = ChatSession::new(ChatHistory::unbounded());

        let reply = dispatcher
            .reply(session.begin_request(), "hallo".into(), Vec::new())
            .await;
        assert_eq!(reply.text, TIMEOUT_REPLY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_applies_before_reply() {
        let dispatcher = ReplyDispatcher::new(Arc::new(SlowEngine(Duration::from_millis(1))))
            .with_delay(ThinkingDelay::new(
                Duration::from_millis(500),
                Duration::from_millis(500),
            ));
        let mut session = ChatSession::new(ChatHistory::unbounded());

        let started = tokio::time::Instant::now();
        let reply = dispatcher
            .reply(session.begin_request(), "hi".into(), Vec::new())
            .await;
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert_eq!(reply.text, "langsam: hi");
    }

    #[tokio::test]
    async fn test_panicking_engine_becomes_apology() {
        let dispatcher = ReplyDispatcher::new(Arc::new(PanickingEngine));
        let mut session = ChatSession::new(ChatHistory::unbounded());
        let reply = dispatcher
            .reply(session.begin_request(), "hallo".into(), Vec::new())
            .await;
        assert_eq!(reply.text, GENERATION_FAILED_REPLY);
    }
}
