//! Core types and trait definitions for the Troth wedding-planning backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod address;
pub mod contact;
pub mod error;
pub mod event;
pub mod field;
pub mod name;
pub mod permission;
pub mod person;
pub mod refs;
pub mod repository;
pub mod security;
pub mod setting;
pub mod user;
pub mod wedding;

pub use error::{Error, Result};
pub use field::Field;
pub use refs::{ChangeRef, CreateRef, UpdateRef};
pub use repository::{Page, Repository};
