//! Common library for the marketplace application
//!
//! This crate provides shared functionality used by the API service:
//! database connectivity, error handling, unique reference codes, and
//! slug generation.

pub mod codes;
pub mod database;
pub mod error;
pub mod text;
