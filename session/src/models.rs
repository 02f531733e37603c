//! Data models for workmate-session.
//!
//! Identity claims, the linked employee profile and the request/response
//! shapes handled by the gateway.

pub mod api_request;
pub mod api_response;
pub mod identity;
pub mod linked_profile;
pub mod request_context;

pub use api_request::{clean_payload, ApiRequest};
pub use api_response::ApiResponse;
pub use identity::Identity;
pub use linked_profile::{LinkedProfile, ProfileRecord};
pub use request_context::{RequestContext, RequestOutcome};
