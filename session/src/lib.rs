//! # workmate-session
//!
//! Session layer for the Workmate HR dashboard.
//!
//! Bridges an identity provider and the HR backend:
//!
//! - **Session state**: identity, linked employee profile and a one-way
//!   `ready` latch, published through `tokio::sync::watch` cells
//! - **Profile reconciliation**: links the signed-in identity to its
//!   employee record, or synthesizes a fallback for unprovisioned users
//! - **Role derivation**: maps the profile department to role flags
//! - **Request gateway**: pre-flight token refresh, bearer injection and
//!   status classification for every API call
//! - **Redirect policy**: dashboard or onboarding once `init` completes
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use workmate_session::{
//!     MemoryNavigator, SessionConfig, SessionController, SessionEvents, StaticTokenProvider,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = SessionConfig::from_file("workmate.toml")?;
//!     config.apply_env_overrides();
//!
//!     let controller = SessionController::builder(config)
//!         .provider(Arc::new(StaticTokenProvider::new(std::env::var("WORKMATE_TOKEN")?)))
//!         .navigator(Arc::new(MemoryNavigator::new("/")))
//!         .events(SessionEvents::new().on_redirect(|path| println!("-> {}", path)))
//!         .build()?;
//!
//!     controller.init().await?;
//!     println!("role: {}", controller.role_flags().role);
//!
//!     let departments = controller.gateway().get("/departments").await?;
//!     println!("{:?}", departments);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod controller;
pub mod error;
pub mod event_handlers;
pub mod gateway;
pub mod models;
pub mod navigation;
pub mod provider;
pub mod reconcile;
pub mod redirect;
pub mod roles;
pub mod store;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use config::{
    ApiSettings, ProfileSettings, ProviderOptions, RefreshSettings, RouteSettings, SessionConfig,
};
pub use context::SessionContext;
pub use controller::{SessionController, SessionControllerBuilder, SessionState, TokenRefreshTask};
pub use error::{ApiFailure, Result, SessionError};
pub use event_handlers::SessionEvents;
pub use gateway::RequestGateway;
pub use models::{
    clean_payload, ApiRequest, ApiResponse, Identity, LinkedProfile, ProfileRecord,
    RequestContext, RequestOutcome,
};
pub use navigation::{ArcNavigator, MemoryNavigator, Navigator};
pub use provider::{ArcTokenProvider, StaticTokenProvider, TokenProvider};
pub use reconcile::{ProfileReconciler, Reconciliation};
pub use redirect::{RedirectPolicy, RootRedirect};
pub use roles::{can_approve, can_manage, derive_role, RoleFlags, RoleRules, RoleTag};
pub use store::{Session, SessionStore};
pub use transport::{HttpTransport, ReqwestTransport, TransportRequest, TransportResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
