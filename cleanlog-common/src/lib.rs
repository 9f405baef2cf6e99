//! # cleanlog Common Library
//!
//! Shared code for the cleanlog backend:
//! - Database initialization and schema synchronization
//! - Row models for cleaning records and shift-end events
//! - Event types and the in-process EventBus
//! - Configuration file loading
//! - Local date/time helpers used by the daily report

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod time;

pub use error::{Error, Result};
pub use events::{CleanlogEvent, EventBus};
