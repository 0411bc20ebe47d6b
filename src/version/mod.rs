//! Version lookup layer
//!
//! Fetches published versions from remote registries, caches expensive
//! lookups with TTL semantics, and resolves the recommended LTS version.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Registry   │────▶│  TtlCache   │◀────│ LtsResolver │
//! │  (fetch)    │     │  (storage)  │     │  (select)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       │
//!        ▼                                       ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │ Registries  │                         │  Lifecycle  │
//! │(index, atom)│                         │   (table)   │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: in-memory TTL cache with single-flight misses
//! - [`clock`]: injectable time source
//! - [`error`]: error types for registry operations
//! - [`lifecycle`]: support lifecycle records consumed by the LTS resolver
//! - [`lts`]: LTS version selection
//! - [`registry`]: registry trait for fetching versions from remote sources
//! - [`registries`]: concrete registry implementations (flat index, Atom feed)

pub mod cache;
pub mod clock;
pub mod error;
pub mod lifecycle;
pub mod lts;
pub mod registries;
pub mod registry;
