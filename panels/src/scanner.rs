//! QR ticket scanner.
//!
//! # Flow
//!
//! ```text
//! Scanning ──Decoded──▶ Verifying ──result──▶ ResultShown ──Resume──▶ Scanning
//! ```
//!
//! Decoded tokens are only honoured while scanning, so a camera that keeps
//! reporting the same code does not trigger duplicate verifications. The
//! result stays on screen until the operator resumes.

use expohub_client::{ApiClient, ApiError, QrVerification, Registration};
use expohub_core::effect::Effect;
use expohub_core::environment::{Clock, SystemClock};
use expohub_core::reducer::Reducer;
use expohub_core::{DateTime, SmallVec, Utc, async_effect, smallvec};
use expohub_runtime::Store;
use expohub_runtime::error::StoreError;
use std::future::Future;
use std::sync::Arc;

/// Backend call that checks a ticket in.
pub trait QrVerifier: Send + Sync {
    /// Verify a decoded QR token.
    ///
    /// # Errors
    ///
    /// Returns the backend rejection (unknown or already used token) or a
    /// transport error.
    fn verify(&self, qr_token: &str)
    -> impl Future<Output = Result<QrVerification, ApiError>> + Send;
}

impl QrVerifier for ApiClient {
    async fn verify(&self, qr_token: &str) -> Result<QrVerification, ApiError> {
        self.verify_qr(qr_token).await
    }
}

/// Scanner phase.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScanPhase {
    /// Waiting for a code.
    #[default]
    Scanning,
    /// A token is being verified.
    Verifying {
        /// Token under verification.
        token: String,
    },
    /// The last result is displayed.
    ResultShown,
}

/// Verification outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// Ticket accepted.
    Verified {
        /// Backend confirmation message.
        message: String,
        /// Checked-in registration, when returned.
        registration: Option<Registration>,
    },
    /// Ticket refused.
    Rejected {
        /// Backend or transport message.
        message: String,
    },
}

/// A finished verification.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Token that was checked.
    pub token: String,
    /// Outcome.
    pub outcome: ScanOutcome,
    /// When the result arrived.
    pub at: DateTime<Utc>,
}

impl ScanResult {
    /// Whether the ticket was accepted.
    #[must_use]
    pub const fn is_verified(&self) -> bool {
        matches!(self.outcome, ScanOutcome::Verified { .. })
    }

    /// Message to show the operator.
    #[must_use]
    pub fn message(&self) -> &str {
        match &self.outcome {
            ScanOutcome::Verified { message, .. } | ScanOutcome::Rejected { message } => message,
        }
    }
}

/// Scanner state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScannerState {
    /// Current phase.
    pub phase: ScanPhase,
    /// Most recent result.
    pub last_result: Option<ScanResult>,
    /// Tickets accepted since start.
    pub verified_count: u32,
    /// Tickets refused since start.
    pub rejected_count: u32,
}

/// Scanner actions.
#[derive(Debug, Clone, PartialEq)]
pub enum ScannerAction {
    /// The camera decoded a code.
    Decoded {
        /// Raw token.
        token: String,
    },
    /// Backend accepted the token.
    Verified {
        /// Token checked.
        token: String,
        /// Backend answer.
        verification: QrVerification,
    },
    /// Backend or transport refused the token.
    Rejected {
        /// Token checked.
        token: String,
        /// Message.
        error: String,
    },
    /// Operator dismissed the result.
    Resume,
}

/// Scanner dependencies.
pub struct ScannerEnvironment<V> {
    /// Ticket verification.
    pub verifier: Arc<V>,
    /// Time source for results.
    pub clock: Arc<dyn Clock>,
}

impl<V> ScannerEnvironment<V> {
    /// Environment using the system clock.
    #[must_use]
    pub fn new(verifier: Arc<V>) -> Self {
        Self {
            verifier,
            clock: Arc::new(SystemClock),
        }
    }
}

impl<V> Clone for ScannerEnvironment<V> {
    fn clone(&self) -> Self {
        Self {
            verifier: Arc::clone(&self.verifier),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Scanner reducer.
pub struct ScannerReducer<V> {
    _phantom: std::marker::PhantomData<fn() -> V>,
}

impl<V> ScannerReducer<V> {
    /// Create a scanner reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<V> Default for ScannerReducer<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Clone for ScannerReducer<V> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<V: QrVerifier + 'static> Reducer for ScannerReducer<V> {
    type State = ScannerState;
    type Action = ScannerAction;
    type Environment = ScannerEnvironment<V>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ScannerAction::Decoded { token } => {
                let token = token.trim().to_string();
                if state.phase != ScanPhase::Scanning || token.is_empty() {
                    tracing::debug!(phase = ?state.phase, "Ignoring decoded code");
                    return smallvec![Effect::None];
                }

                state.phase = ScanPhase::Verifying {
                    token: token.clone(),
                };
                let verifier = Arc::clone(&env.verifier);

                smallvec![async_effect! {
                    match verifier.verify(&token).await {
                        Ok(verification) => Some(ScannerAction::Verified { token, verification }),
                        Err(error) => Some(ScannerAction::Rejected {
                            token,
                            error: error.to_string(),
                        }),
                    }
                }]
            },

            ScannerAction::Verified {
                token,
                verification,
            } => {
                tracing::info!("Ticket verified");
                state.verified_count = state.verified_count.saturating_add(1);
                state.phase = ScanPhase::ResultShown;
                state.last_result = Some(ScanResult {
                    token,
                    outcome: ScanOutcome::Verified {
                        message: verification
                            .message
                            .unwrap_or_else(|| "Ticket verified".to_string()),
                        registration: verification.registration,
                    },
                    at: env.clock.now(),
                });
                smallvec![Effect::None]
            },

            ScannerAction::Rejected { token, error } => {
                tracing::info!(%error, "Ticket rejected");
                state.rejected_count = state.rejected_count.saturating_add(1);
                state.phase = ScanPhase::ResultShown;
                state.last_result = Some(ScanResult {
                    token,
                    outcome: ScanOutcome::Rejected { message: error },
                    at: env.clock.now(),
                });
                smallvec![Effect::None]
            },

            ScannerAction::Resume => {
                if state.phase == ScanPhase::ResultShown {
                    state.phase = ScanPhase::Scanning;
                }
                smallvec![Effect::None]
            },
        }
    }
}

type ScannerStore<V> = Store<ScannerState, ScannerAction, ScannerEnvironment<V>, ScannerReducer<V>>;

/// Scanner with its own store.
pub struct QrScanner<V: QrVerifier + 'static> {
    store: ScannerStore<V>,
}

impl<V: QrVerifier + 'static> QrScanner<V> {
    /// Start a scanner in the scanning phase.
    #[must_use]
    pub fn new(verifier: Arc<V>) -> Self {
        Self::with_environment(ScannerEnvironment::new(verifier))
    }

    /// Start a scanner with a custom environment.
    #[must_use]
    pub fn with_environment(environment: ScannerEnvironment<V>) -> Self {
        Self {
            store: Store::new(ScannerState::default(), ScannerReducer::new(), environment),
        }
    }

    /// Feed a decoded code and wait for its verification, if one started.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scanner is shutting down.
    pub async fn decoded(&self, token: &str) -> Result<ScannerState, StoreError> {
        self.dispatch(ScannerAction::Decoded {
            token: token.to_string(),
        })
        .await
    }

    /// Dismiss the shown result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the scanner is shutting down.
    pub async fn resume(&self) -> Result<ScannerState, StoreError> {
        self.dispatch(ScannerAction::Resume).await
    }

    /// Current state.
    pub async fn snapshot(&self) -> ScannerState {
        self.store.state(Clone::clone).await
    }

    async fn dispatch(&self, action: ScannerAction) -> Result<ScannerState, StoreError> {
        let mut handle = self.store.send(action).await?;
        handle.wait().await;
        Ok(self.snapshot().await)
    }
}

impl<V: QrVerifier + 'static> std::fmt::Debug for QrScanner<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrScanner").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use expohub_testing::{ReducerTest, assertions, test_clock};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Accepts `good`, refuses everything else.
    #[derive(Default)]
    struct Gate {
        calls: AtomicUsize,
    }

    impl QrVerifier for Gate {
        fn verify(
            &self,
            qr_token: &str,
        ) -> impl Future<Output = Result<QrVerification, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let accepted = qr_token == "good";
            async move {
                if accepted {
                    Ok(QrVerification {
                        message: Some("Welcome".to_string()),
                        ..QrVerification::default()
                    })
                } else {
                    Err(ApiError::Status {
                        status: 400,
                        message: "QR code already used".to_string(),
                    })
                }
            }
        }
    }

    fn env() -> ScannerEnvironment<Gate> {
        ScannerEnvironment {
            verifier: Arc::new(Gate::default()),
            clock: Arc::new(test_clock()),
        }
    }

    #[test]
    fn test_decoded_starts_verification() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState::default())
            .when_action(ScannerAction::Decoded {
                token: " good ".to_string(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.phase,
                    ScanPhase::Verifying {
                        token: "good".to_string()
                    }
                );
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn test_decoded_ignored_while_paused() {
        for phase in [
            ScanPhase::Verifying {
                token: "first".to_string(),
            },
            ScanPhase::ResultShown,
        ] {
            let expected = phase.clone();
            ReducerTest::new(ScannerReducer::new())
                .with_env(env())
                .given_state(ScannerState {
                    phase,
                    ..ScannerState::default()
                })
                .when_action(ScannerAction::Decoded {
                    token: "second".to_string(),
                })
                .then_state(move |state| assert_eq!(state.phase, expected))
                .then_effects(assertions::assert_no_effects)
                .run();
        }
    }

    #[test]
    fn test_result_shown_until_resume() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState::default())
            .when_actions([
                ScannerAction::Decoded {
                    token: "used".to_string(),
                },
                ScannerAction::Rejected {
                    token: "used".to_string(),
                    error: "QR code already used".to_string(),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.phase, ScanPhase::ResultShown);
                assert_eq!(state.rejected_count, 1);
                let result = state.last_result.as_ref().unwrap();
                assert!(!result.is_verified());
                assert_eq!(result.message(), "QR code already used");
                assert_eq!(result.at, test_clock().now());
            })
            .run();
    }

    #[test]
    fn test_counters_saturate() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState {
                verified_count: u32::MAX,
                rejected_count: u32::MAX,
                ..ScannerState::default()
            })
            .when_actions([
                ScannerAction::Verified {
                    token: "good".to_string(),
                    verification: QrVerification::default(),
                },
                ScannerAction::Resume,
                ScannerAction::Rejected {
                    token: "used".to_string(),
                    error: "QR code already used".to_string(),
                },
            ])
            .then_state(|state| {
                assert_eq!(state.verified_count, u32::MAX);
                assert_eq!(state.rejected_count, u32::MAX);
                assert_eq!(state.phase, ScanPhase::ResultShown);
            })
            .run();
    }

    #[test]
    fn test_resume_only_from_result() {
        ReducerTest::new(ScannerReducer::new())
            .with_env(env())
            .given_state(ScannerState {
                phase: ScanPhase::Verifying {
                    token: "t".to_string(),
                },
                ..ScannerState::default()
            })
            .when_action(ScannerAction::Resume)
            .then_state(|state| assert!(matches!(state.phase, ScanPhase::Verifying { .. })))
            .run();
    }

    #[tokio::test]
    async fn test_scanner_store_cycle() {
        let gate = Arc::new(Gate::default());
        let scanner = QrScanner::with_environment(ScannerEnvironment {
            verifier: Arc::clone(&gate),
            clock: Arc::new(test_clock()),
        });

        let state = scanner.decoded("good").await.unwrap();
        assert_eq!(state.phase, ScanPhase::ResultShown);
        assert!(state.last_result.unwrap().is_verified());

        // Paused: the same code seen again is not re-verified
        scanner.decoded("good").await.unwrap();
        assert_eq!(gate.calls.load(Ordering::SeqCst), 1);

        let state = scanner.resume().await.unwrap();
        assert_eq!(state.phase, ScanPhase::Scanning);

        let state = scanner.decoded("bad").await.unwrap();
        assert_eq!(state.rejected_count, 1);
        assert_eq!(state.verified_count, 1);
        assert_eq!(gate.calls.load(Ordering::SeqCst), 2);
    }
}
