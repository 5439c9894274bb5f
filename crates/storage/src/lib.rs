//! slotlove-storage: persisted tables for the SlotLove card spinner.
//!
//! Three JSON documents make up the state: `options` (category -> codes),
//! `scores` (code -> feedback score) and `mapping` (code -> label or
//! capability record). [`SpinnerStore`] abstracts where they live;
//! [`JsonFileStore`] and [`InMemoryStore`] are the two backends.

pub mod conformance;
mod error;
mod file_store;
mod memory;
mod tables;
mod traits;

pub use error::StoreError;
pub use file_store::JsonFileStore;
pub use memory::InMemoryStore;
pub use tables::{
    Catalog, Category, CategoryMap, Code, Document, MappingEntry, MappingTable, OptionsTable,
    ScoreTable,
};
pub use traits::SpinnerStore;
