//! Identity binding storage.
//!
//! A binding ties one messaging identity to the student it may ask about.
//! The durable store is a single pretty-printed JSON object at
//! `auth/user_binding.json` (configurable), rewritten whole on every change
//! under an exclusive file lock.

pub mod binding;
pub mod error;
pub mod file_store;
pub mod locks;

pub use {
    binding::{BindingRecord, BindingStore, InMemoryBindingStore},
    error::{Error, Result},
    file_store::JsonFileBindingStore,
    locks::IdentityLocks,
};
