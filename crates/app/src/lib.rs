//! # luma-app
//!
//! Application layer: matching engines, queue/worker model, and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound
//!   ports):
//!   - [`ports::PersistStore`]: the key/value persistence table
//!   - [`ports::Origin`]: one configured vendor connection
//! - Hold the validated [`children::Children`] registry and enforce
//!   cross-reference invariants
//! - Evaluate rules: [`engine::whered`] / [`engine::occurd`] combination,
//!   the [`engine::DesiredEngine`] planner and [`engine::AspiredEngine`]
//!   reactor
//! - Provide **in-process infrastructure** that doesn't need IO: the
//!   broadcast [`stream_bus::StreamBus`] and bounded work queues
//! - Run the per-origin worker tasks and the [`service::Service`]
//!   orchestration
//!
//! ## Dependency rule
//! Depends on `luma-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod children;
pub mod engine;
pub mod ports;
pub mod service;
pub mod stream_bus;
