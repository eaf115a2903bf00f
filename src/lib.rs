//! # Rex Claims Core
//!
//! Core engine for the Rex AI insurance claims workspace: the domain
//! store and its derived metrics, the multi-step intake flow engine,
//! whole-document JSON persistence, and the best-effort call-request
//! relay.
//!
//! ## Architecture
//!
//! ```text
//! CLI / host UI → DomainStore → JsonStore (single JSON document)
//!                     ↓
//!          HttpCallRelay → call-intake service (HTTP)
//!
//! FlowEngine (claim / policy wizards) → DomainStore::create_*
//!          ↑
//!   AssistantClient → claim-assistant service (HTTP)
//! ```
//!
//! The store is an explicitly constructed value with a single-writer
//! assumption; every mutation rewrites the whole persisted document.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use rex_claims::{Config, DomainStore, SignUpInput};
//! use rex_claims::persistence::JsonStore;
//! use rex_claims::relay::HttpCallRelay;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let persistence = JsonStore::new(&config.store.path)?;
//!     let relay = Arc::new(HttpCallRelay::new(&config.relay, &config.request)?);
//!     let mut store = DomainStore::open(persistence, relay);
//!     store.sign_up(SignUpInput {
//!         full_name: "Ada Lovelace".into(),
//!         email: "ada@example.com".into(),
//!         password: "hunter2".into(),
//!     })?;
//!     println!("{:?}", store.metrics());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Claim-assistant service boundary client and draft bridging.
pub mod assistant;
/// Configuration management.
pub mod config;
/// Domain entities, status enums, and answer-bag helpers.
pub mod domain;
/// Error types and result aliases for the application.
pub mod error;
/// Multi-step intake flow engine and question catalogs.
pub mod flow;
/// Entity identifier generation.
pub mod ids;
/// Derived dashboard metrics.
pub mod metrics;
/// Whole-document JSON persistence.
pub mod persistence;
/// Call-intake relay client.
pub mod relay;
/// The application domain store.
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult, StoreError};
pub use store::{CallOutcome, Credentials, DomainStore, SignUpInput};
