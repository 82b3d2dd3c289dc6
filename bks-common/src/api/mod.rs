//! Framework-independent pieces of the HTTP API
//!
//! The web crate wraps these in axum middleware.

pub mod auth;

pub use auth::{
    canonical_json, check_timestamp, load_or_create_shared_secret, sign, sign_request,
    verify_signature, SignatureError,
};
