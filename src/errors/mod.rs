//! Error types and error handling for pydytype.
//!
//! This module defines the error types used throughout the crate:
//!
//! - Source errors (lexing and parsing) with position information
//! - Resolution, conformance and literal evaluation errors
//! - Monitor and configuration errors
//! - Error tips used when rendering source errors

pub mod errors;
