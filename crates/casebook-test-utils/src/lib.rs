//! Test helpers shared across Casebook crates.

pub mod embedder;
pub mod fixtures;
pub mod generator;
pub mod store;

pub use embedder::{FailingEmbedder, FixedEmbedder};
pub use fixtures::{RecordBuilder, scored};
pub use generator::{FailingGenerator, FixedGenerator, RecordingGenerator};
pub use store::{Scripted, StoreCall, StubStore};
