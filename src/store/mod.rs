//! Persistence layer.
//!
//! The engine talks to an injected store handle rather than a shared
//! global. Every store method is atomic at the single-record level; the
//! engine layers per-market exclusivity on top of that.

pub mod memory;

pub use memory::MemoryStore;
