//! Core domain entities.
//!
//! - [`Link`] - A shortened URL mapping with access count and expiry
//! - [`NewLink`] - Input for creating a link

pub mod link;

pub use link::{Link, NewLink};
