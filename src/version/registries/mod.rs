//! Registry implementations for fetching package versions

pub mod atom_feed;
pub mod flat_index;

pub use atom_feed::AtomFeedRegistry;
pub use flat_index::FlatIndexRegistry;
