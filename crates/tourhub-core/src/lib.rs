//! Core types and trait definitions for the TourHub client.
//!
//! This crate is free of HTTP dependencies. The session store, the backend
//! adapter and the CLI all depend on it.

pub mod backend;
pub mod error;
pub mod identity;
pub mod outcome;
pub mod profile;
pub mod role;
pub mod session;
pub mod validate;

pub use error::{Error, ErrorKind, Result};
pub use outcome::Outcome;
