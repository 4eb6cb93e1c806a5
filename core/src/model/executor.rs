//! Turn executor: one model invocation with bounded retry
//!
//! Rate-limit errors are the only transient class. Everything else
//! propagates immediately, and exhausting the retry budget re-raises
//! the last rate-limit error as fatal.

use crate::error::Result;
use crate::model::client::{FunctionDeclaration, ModelClient, ModelReply};
use crate::model::turn::Turn;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Total attempts per model invocation, including the first.
const MAX_ATTEMPTS: u32 = 3;

/// Executes single model turns with rate-limit-aware backoff.
/// Holds no conversation state.
pub struct TurnExecutor {
    client: Arc<dyn ModelClient>,
}

impl TurnExecutor {
    /// Create a new turn executor over the given client
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Get the underlying model name
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Perform exactly one model invocation, retrying rate limits.
    ///
    /// Delay before retry attempt N is the server-advertised retry delay
    /// (zero when absent) plus a `2^N` second backoff term, N starting
    /// at 1.
    pub async fn execute(
        &self,
        history: &[Turn],
        declarations: &[FunctionDeclaration],
    ) -> Result<ModelReply> {
        let mut attempt = 1;

        loop {
            match self.client.generate(history, declarations).await {
                Ok(reply) => return Ok(reply),
                Err(err) if err.is_rate_limited() && attempt < MAX_ATTEMPTS => {
                    let server_delay = err.retry_after().unwrap_or(Duration::ZERO);
                    let backoff = Duration::from_secs(1u64 << attempt);
                    let delay = server_delay + backoff;

                    warn!(
                        attempt,
                        delay_secs = delay.as_secs_f64(),
                        "Model endpoint rate limited, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ModelError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    enum ScriptItem {
        RateLimited(Option<Duration>),
        Fatal,
        Reply(ModelReply),
    }

    struct ScriptedClient {
        calls: AtomicUsize,
        script: Mutex<VecDeque<ScriptItem>>,
    }

    impl ScriptedClient {
        fn new(script: Vec<ScriptItem>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModelClient for ScriptedClient {
        async fn generate(
            &self,
            _history: &[Turn],
            _declarations: &[FunctionDeclaration],
        ) -> Result<ModelReply> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().unwrap().pop_front() {
                Some(ScriptItem::RateLimited(retry_after)) => {
                    Err(ModelError::RateLimited { retry_after }.into())
                }
                Some(ScriptItem::Fatal) => Err(ModelError::Api {
                    status: 500,
                    message: "boom".to_string(),
                }
                .into()),
                Some(ScriptItem::Reply(reply)) => Ok(reply),
                None => panic!("script exhausted"),
            }
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }

    fn text_reply(text: &str) -> ModelReply {
        ModelReply {
            text: Some(text.to_string()),
            function_calls: Vec::new(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_two_rate_limits() {
        let client = Arc::new(ScriptedClient::new(vec![
            ScriptItem::RateLimited(None),
            ScriptItem::RateLimited(None),
            ScriptItem::Reply(text_reply("ok")),
        ]));
        let executor = TurnExecutor::new(client.clone());

        let start = Instant::now();
        let reply = executor.execute(&[], &[]).await.unwrap();

        assert_eq!(reply.text.as_deref(), Some("ok"));
        assert_eq!(client.calls(), 3);
        // Backoff terms alone: 2^1 + 2^2 seconds.
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn honors_server_advertised_delay() {
        let client = Arc::new(ScriptedClient::new(vec![
            ScriptItem::RateLimited(Some(Duration::from_secs(5))),
            ScriptItem::Reply(text_reply("ok")),
        ]));
        let executor = TurnExecutor::new(client.clone());

        let start = Instant::now();
        executor.execute(&[], &[]).await.unwrap();

        assert_eq!(client.calls(), 2);
        // Server delay plus the 2^1 backoff term.
        assert!(start.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_reraise_rate_limit() {
        let client = Arc::new(ScriptedClient::new(vec![
            ScriptItem::RateLimited(None),
            ScriptItem::RateLimited(None),
            ScriptItem::RateLimited(None),
        ]));
        let executor = TurnExecutor::new(client.clone());

        let err = executor.execute(&[], &[]).await.unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_rate_limit_error_is_immediate() {
        let client = Arc::new(ScriptedClient::new(vec![ScriptItem::Fatal]));
        let executor = TurnExecutor::new(client.clone());

        let start = Instant::now();
        let err = executor.execute(&[], &[]).await.unwrap_err();

        assert!(matches!(err, Error::Model(ModelError::Api { status: 500, .. })));
        assert_eq!(client.calls(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
