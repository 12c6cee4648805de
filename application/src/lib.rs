//! Application provides the REST API for interacting with the [`Service`].

#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod api;
pub mod args;
pub mod config;
mod context;
pub mod error;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
// Used in binary.
use axum_client_ip as _;
use tower_http as _;
use tracing_subscriber as _;

pub use self::{
    args::Args,
    config::Config,
    context::{Context, Session},
    error::{AsError, Error},
};

/// [`Service`] with filled infrastructure dependencies.
///
/// [`Service`]: service::Service
pub type Service = service::Service<service::infra::InMemory>;

/// Returns the [`Router`] of the REST API, with the provided [`Service`]
/// attached as an [`Extension`].
#[must_use]
pub fn router(service: Service) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/register", post(api::user::register))
        .route("/login", post(api::user::login))
        .route("/me", get(api::user::me))
        .route("/me/name", put(api::user::update_name))
        .route("/me/password", put(api::user::update_password))
        .layer(Extension(service))
}
