//! Data-access core for the my-shop storefront API.
//!
//! # Overview
//! Fetches and mutates the authenticated user's shop and its orders, and
//! exposes each operation as an explicit state object: `QueryHandle` for
//! cached reads, `Mutation` for writes.
//!
//! # Design
//! - `ShopClient` is stateless: it builds `HttpRequest` values and parses
//!   `HttpResponse` values without touching the network.
//! - `Transport` adds a fresh bearer credential to every request and runs it
//!   through an `HttpExecutor` (reqwest in production, scripted in tests).
//! - `QueryCache` de-duplicates concurrent reads per key and discards
//!   superseded responses by generation.
//! - `Mutation` drives one write at a time, invalidates affected keys and
//!   notifies exactly once per outcome.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod http;
pub mod mutation;
pub mod notify;
pub mod query;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use api::MyShopApi;
pub use client::{Operation, ShopClient};
pub use config::ApiConfig;
pub use credential::{Credential, CredentialProvider, StaticCredential};
pub use error::ApiError;
pub use http::{HttpBody, HttpExecutor, HttpMethod, HttpRequest, HttpResponse, NetworkError, ReqwestExecutor};
pub use mutation::{Mutation, MutationKind, MutationPhase, MutationState};
pub use notify::{NotificationKind, Notifier, RecordingNotifier, TracingNotifier};
pub use query::{QueryCache, QueryHandle, QueryKey};
pub use transport::Transport;
pub use types::{
    CartItem, DeliveryDetails, MenuItem, Order, OrderStatus, Shop, ShopForm, ShopImage,
    UpdateOrderStatusRequest,
};
