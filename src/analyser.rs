//! Dataset analysis: the per-request engines in [`logic`] and the loaded
//! dataset they run against in [`store`].

pub mod logic;
pub mod store;

pub use store::{DatasetSnapshot, DatasetStore, Preview};
