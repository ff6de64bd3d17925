//! Core types for the event-log lab.
//!
//! Holds the raw and cleaned row models, the error type, field processors
//! (timestamps, revenue coercion), report formatting helpers and the CLI
//! settings shared by the other crates.

pub mod data_processors;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{EventLabError, Result};
