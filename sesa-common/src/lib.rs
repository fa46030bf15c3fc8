//! Shared types for SESA (Spoken English Scoring Assistant)
//!
//! Common error taxonomy and configuration documents used by the
//! pronunciation assessment service.

pub mod config;
pub mod error;

pub use error::{Error, Result};
