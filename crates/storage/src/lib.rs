//! Storage abstraction and implementations for sessionplan.
//!
//! This crate provides the trait-based contract the planner service uses to
//! persist plans and read current quota usage, with a JSON file reference
//! implementation.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;

pub use trait_::{Storage, StorageError, Result, TimeRange};
pub use json_storage::JsonStorage;
