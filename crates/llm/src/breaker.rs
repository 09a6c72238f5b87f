//! Circuit Breaker
//!
//! Guards every call to the reasoning capability. The breaker is a single
//! injectable component shared by all concurrent turns; its state lives
//! behind one mutex, never in module-level statics.
//!
//! States: `Closed` passes calls through and counts consecutive failures;
//! `Open` rejects immediately without touching the provider; `HalfOpen`
//! admits exactly one probe after the cooldown, closing on success and
//! re-opening on failure.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::provider::LlmProvider;
use super::types::{LlmError, LlmResponse, LlmResult, Message, ToolDefinition};

/// Tuning for the circuit breaker
#[derive(Debug, Clone)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens
    pub failure_threshold: u32,
    /// How long the breaker stays open before admitting a probe
    pub cooldown: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
        }
    }
}

/// Observable breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker guarding the reasoning capability.
///
/// All transitions happen inside [`try_acquire`], [`record_success`], and
/// [`record_failure`]; callers never mutate state directly.
///
/// [`try_acquire`]: CircuitBreaker::try_acquire
/// [`record_success`]: CircuitBreaker::record_success
/// [`record_failure`]: CircuitBreaker::record_failure
#[derive(Debug)]
pub struct CircuitBreaker {
    config: BreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a breaker in the closed state
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
        }
    }

    /// Current state, for probes and logging
    pub fn state(&self) -> BreakerState {
        self.inner.lock().expect("breaker lock poisoned").state
    }

    /// Ask permission to issue a call.
    ///
    /// Returns `Ok(())` when the call may proceed. While open, rejects with
    /// `CircuitOpen` until the cooldown elapses, at which point exactly one
    /// caller is admitted as the half-open probe; concurrent callers keep
    /// being rejected until that probe settles.
    pub fn try_acquire(&self) -> LlmResult<()> {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::HalfOpen => Err(LlmError::CircuitOpen {
                message: "probe already in flight".to_string(),
            }),
            BreakerState::Open => {
                let elapsed = inner
                    .opened_at
                    .map(|t| t.elapsed())
                    .unwrap_or(Duration::ZERO);
                if elapsed >= self.config.cooldown {
                    inner.state = BreakerState::HalfOpen;
                    debug!("circuit breaker half-open, admitting probe");
                    Ok(())
                } else {
                    Err(LlmError::CircuitOpen {
                        message: format!(
                            "cooling down, {}s remaining",
                            (self.config.cooldown - elapsed).as_secs()
                        ),
                    })
                }
            }
        }
    }

    /// Record a successful call
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        if inner.state == BreakerState::HalfOpen {
            debug!("circuit breaker probe succeeded, closing");
        }
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.opened_at = None;
    }

    /// Record a failed call
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().expect("breaker lock poisoned");
        match inner.state {
            BreakerState::HalfOpen => {
                warn!("circuit breaker probe failed, re-opening");
                inner.state = BreakerState::Open;
                inner.opened_at = Some(Instant::now());
            }
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        failures = inner.consecutive_failures,
                        "circuit breaker opening"
                    );
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            BreakerState::Open => {
                // Late failure from a call admitted before opening; nothing to do.
            }
        }
    }
}

/// A provider wrapped by the breaker and a hard deadline.
///
/// This is the only path the orchestrator uses to reach the reasoning
/// capability: fail-fast when open, timeout enforced, and every outcome
/// reported back to the breaker.
pub struct GuardedProvider {
    provider: Arc<dyn LlmProvider>,
    breaker: Arc<CircuitBreaker>,
    timeout: Duration,
}

impl GuardedProvider {
    /// Wrap a provider with a shared breaker and a call deadline
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        breaker: Arc<CircuitBreaker>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            breaker,
            timeout,
        }
    }

    /// The shared breaker, for observability
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Send a conversation through the breaker.
    ///
    /// Timeouts and service-side failures count toward opening the breaker;
    /// request-shape mistakes do not (see
    /// [`LlmError::counts_as_breaker_failure`]).
    pub async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tools: Vec<ToolDefinition>,
    ) -> LlmResult<LlmResponse> {
        self.breaker.try_acquire()?;

        let call = self.provider.send_message(messages, system, tools);
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(response)) => {
                self.breaker.record_success();
                Ok(response)
            }
            Ok(Err(e)) => {
                if e.counts_as_breaker_failure() {
                    self.breaker.record_failure();
                }
                Err(e)
            }
            Err(_) => {
                self.breaker.record_failure();
                Err(LlmError::Timeout {
                    message: format!("reasoning call exceeded {}s", self.timeout.as_secs()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StopReason, UsageStats};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Provider that fails or succeeds on demand and counts invocations
    struct ScriptedProvider {
        fail: std::sync::atomic::AtomicBool,
        calls: AtomicU32,
    }

    impl ScriptedProvider {
        fn new(fail: bool) -> Self {
            Self {
                fail: std::sync::atomic::AtomicBool::new(fail),
                calls: AtomicU32::new(0),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn send_message(
            &self,
            _messages: Vec<Message>,
            _system: Option<String>,
            _tools: Vec<ToolDefinition>,
        ) -> LlmResult<LlmResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(LlmError::ServerError {
                    message: "simulated outage".to_string(),
                    status: Some(503),
                })
            } else {
                Ok(LlmResponse {
                    content: Some("ok".to_string()),
                    tool_calls: vec![],
                    stop_reason: StopReason::EndTurn,
                    usage: UsageStats::default(),
                    model: "scripted-model".to_string(),
                })
            }
        }

        async fn health_check(&self) -> LlmResult<()> {
            Ok(())
        }
    }

    fn breaker_with(threshold: u32, cooldown: Duration) -> Arc<CircuitBreaker> {
        Arc::new(CircuitBreaker::new(BreakerConfig {
            failure_threshold: threshold,
            cooldown,
        }))
    }

    #[test]
    fn test_opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(BreakerConfig::default());
        for _ in 0..4 {
            breaker.record_failure();
            assert_eq!(breaker.state(), BreakerState::Closed);
        }
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let breaker = CircuitBreaker::new(BreakerConfig::default());
        for _ in 0..4 {
            breaker.record_failure();
        }
        breaker.record_success();
        for _ in 0..4 {
            breaker.record_failure();
        }
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_open_rejects_until_cooldown() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::from_secs(3600),
        });
        breaker.record_failure();
        assert!(matches!(
            breaker.try_acquire(),
            Err(LlmError::CircuitOpen { .. })
        ));
    }

    #[test]
    fn test_half_open_admits_exactly_one_probe() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::ZERO,
        });
        breaker.record_failure();

        // Cooldown already elapsed: first acquire becomes the probe,
        // the second is rejected while the probe is in flight.
        assert!(breaker.try_acquire().is_ok());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert!(matches!(
            breaker.try_acquire(),
            Err(LlmError::CircuitOpen { .. })
        ));

        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[test]
    fn test_probe_failure_reopens() {
        let breaker = CircuitBreaker::new(BreakerConfig {
            failure_threshold: 1,
            cooldown: Duration::ZERO,
        });
        breaker.record_failure();
        assert!(breaker.try_acquire().is_ok());
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
    }

    #[tokio::test]
    async fn test_guarded_provider_opens_and_fails_fast() {
        let provider = Arc::new(ScriptedProvider::new(true));
        let breaker = breaker_with(5, Duration::from_secs(3600));
        let guarded = GuardedProvider::new(
            provider.clone(),
            breaker.clone(),
            Duration::from_secs(5),
        );

        for _ in 0..5 {
            let err = guarded
                .send_message(vec![Message::user("hi")], None, vec![])
                .await
                .unwrap_err();
            assert!(matches!(err, LlmError::ServerError { .. }));
        }
        assert_eq!(breaker.state(), BreakerState::Open);
        assert_eq!(provider.call_count(), 5);

        // Sixth call is rejected without reaching the provider.
        let err = guarded
            .send_message(vec![Message::user("hi")], None, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::CircuitOpen { .. }));
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn test_guarded_provider_probe_recovers() {
        let provider = Arc::new(ScriptedProvider::new(true));
        let breaker = breaker_with(1, Duration::ZERO);
        let guarded = GuardedProvider::new(
            provider.clone(),
            breaker.clone(),
            Duration::from_secs(5),
        );

        let _ = guarded
            .send_message(vec![Message::user("hi")], None, vec![])
            .await;
        assert_eq!(breaker.state(), BreakerState::Open);

        // Service recovers; the probe call closes the breaker.
        provider.fail.store(false, Ordering::SeqCst);
        let response = guarded
            .send_message(vec![Message::user("hi")], None, vec![])
            .await
            .unwrap();
        assert_eq!(response.content.as_deref(), Some("ok"));
        assert_eq!(breaker.state(), BreakerState::Closed);
    }
}
