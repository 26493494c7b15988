//! Support Runtime - intent routing and capability delegation
//!
//! This crate is the decision core of the glidedesk service:
//! - Classifies free-text or tagged requests into one support capability
//! - Dispatches each request to exactly one capability agent
//! - Binds callback tools (booking, tracking, OCR, PAN parsing, retrieval)
//!   behind a uniform invocation contract
//! - Wires external collaborators (LLM runtime, OCR engine, blob storage,
//!   session store) through trait seams with in-memory defaults
//!
//! # Architecture
//!
//! Dispatch is a constrained pipeline:
//! 1. **Classification** (`classify`) - explicit intent, then ordered keyword
//!    rules, then the configured default
//! 2. **Delegation** (`orchestrator`) - registry lookup with a FAQ fallback
//! 3. **Tool Execution** (`tools`) - typed `Result` from every tool
//! 4. **Response Shaping** (`capabilities`) - failures become well-formed
//!    responses at the capability boundary
//!
//! # Key Types
//!
//! - `SupportRuntime` / `build_runtime` - explicit startup factory
//! - `Orchestrator` - registry + dispatch (see `orchestrator` module)
//! - `CapabilityAgent` - the uniform `handle(request) -> response` seam
//!
//! # Routing Principle
//!
//! The orchestrator never post-processes a capability's response and never
//! surfaces an unhandled fault to the transport: once a well-formed request
//! is accepted, the caller always gets a structurally valid response.

pub mod capabilities;
pub mod classify;
pub mod llm;
pub mod orchestrator;
pub mod runtime;
pub mod session;
pub mod storage;
pub mod tools;

pub use classify::{ClassificationRule, IntentClassifier};
pub use orchestrator::Orchestrator;
pub use runtime::{build_runtime, BuildError, RuntimeDeps, SupportRuntime};
