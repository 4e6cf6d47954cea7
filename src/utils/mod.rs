//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code strategies (random and id-encoded)
//! - [`url_validator`] - Target URL validation
//! - [`client_ip`] - Client identity extraction for rate limiting
//! - [`db_error`] - Database error classification

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod url_validator;
