//! # Payrun Client
//!
//! HTTP clients for the two external services payrun orchestrates:
//!
//! * [`AuthClient`] - the auth service: login, group lookup, and the
//!   delegation-token exchange (with base-token fallback), plus user
//!   registration for the provisioning pipeline. Tokens are cached per
//!   `(user, group)` for the lifetime of one run.
//! * [`PaymentsClient`] - the payments service: REST with bearer auth and
//!   GraphQL-over-HTTP with structured `{query, variables}` bodies.
//!
//! Both implement the gateway traits from `payrun-core`, keeping the
//! orchestration core free of HTTP concerns.

mod auth;
mod error;
mod graphql;
mod payments;

pub use auth::AuthClient;
pub use error::ClientError;
pub use graphql::{GraphQlError, GraphQlRequest, GraphQlResponse};
pub use payments::PaymentsClient;
