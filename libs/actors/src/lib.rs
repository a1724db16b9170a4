//! # Lattice Actor Runtime
//!
//! Addressable actors owning private relational stores, a uniform
//! request/response protocol, and the two orchestration primitives that turn
//! many actors into one logical distributed operation: fan-out/fan-in
//! aggregation and the sequential pipeline.
//!
//! ```text
//! ┌─────────────────────────┐      ┌───────────────────────────────┐
//! │       ActorSystem       │      │        Orchestration          │
//! │                         │      │                               │
//! │  catalog#1 ── StoreSet  │◄─────│  ask_all: fan out, union,     │
//! │  catalog#2 ── StoreSet  │      │           fail fast           │
//! │  archive#1 ── StoreSet  │◄─────│  Pipeline: round after round, │
//! │        ...              │      │            one coordinator    │
//! └─────────────────────────┘      └───────────────────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **One reply per request**: every envelope is answered with exactly one
//!   Success or Failure, never silence, never both.
//! - **Exclusive ownership**: relation mutations happen inside the owning
//!   actor's mailbox loop; no cross-actor shared mutable state exists.
//! - **Fail fast**: the first failure of an aggregation round is the whole
//!   round's outcome; later rounds never start.
//! - **At-most-once results**: a caller that timed out never also receives a
//!   late Success.

pub mod actor;
pub mod config;
pub mod error;
pub mod gather;
pub mod message;
pub mod pipeline;
pub mod registry;
pub mod store;
pub mod system;

pub use actor::Actor;
pub use config::SystemConfig;
pub use error::EngineError;
pub use gather::ask_all;
pub use message::{expect_request, Envelope, InsertRequest, Request, Response, Success};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use registry::{ActorAddr, ActorName};
pub use store::StoreSet;
pub use system::{ActorSystem, SystemMetrics};
