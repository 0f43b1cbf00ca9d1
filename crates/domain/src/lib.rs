//! # luma-domain
//!
//! Pure domain model for the luma home automation rules engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **children**, the declarative config objects: devices, groups,
//!   scenes, desires, and aspires
//! - Define **conditions** (`where` drivers) and **occurrences** (`occur`
//!   drivers) that desires/aspires are built from
//! - Define **stream events** and **origin snapshots**, including the
//!   snapshot diff that turns polled vendor state into events
//! - Define the queue payloads exchanged between service workers
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod aspire;
pub mod condition;
pub mod desire;
pub mod device;
pub mod group;
pub mod items;
pub mod occur;
pub mod persist;
pub mod scene;
pub mod snapshot;
pub mod stage;
pub mod stream;
