//! # ExpoHub Session
//!
//! The client's authentication session: a reducer-driven state machine, the
//! durable storage it persists to, and the routing policy and guard that
//! depend on it.
//!
//! ## Lifecycle
//!
//! ```text
//! Anonymous ──SendOtp ok──▶ OtpPending ──VerifyOtp ok──▶ Authenticated
//!     │                        │  ▲                          │
//!     │                        │  └── VerifyOtp failed       │
//!     │                        └──CancelOtp──▶ Anonymous     │
//!     └──LoginAdmin / LoginWithGoogle ok──▶ Authenticated    │
//!                                     Logout ◀───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use expohub_client::ApiClient;
//! use expohub_session::{MemoryStorage, SessionContext, StoredToken};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MemoryStorage::new();
//! let api = ApiClient::new("http://localhost:8000/api/")?
//!     .with_token_source(Arc::new(StoredToken(storage.clone())));
//! let session = SessionContext::new(Arc::new(api), storage);
//!
//! session.send_otp("+911234567890").await?;
//! let state = session.verify_otp("+911234567890", "123456").await?;
//! if state.is_authenticated() {
//!     println!("go to {}", session.next_route().await);
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod context;
pub mod environment;
pub mod reducer;
pub mod routing;
pub mod state;
pub mod storage;

pub use actions::{LoginMethod, SessionAction};
pub use context::SessionContext;
pub use environment::SessionEnvironment;
pub use reducer::SessionReducer;
pub use routing::{GuardDecision, Route, RouteGuard, landing_route, next_route_for};
pub use state::{SessionPhase, SessionState};
pub use storage::{
    FileStorage, MemoryStorage, PersistedSession, SessionStorage, StorageError, StoredToken,
};
