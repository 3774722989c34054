//! Read-side helpers over already-fetched TourHub collections.
//!
//! Everything here is synchronous and works on slices the caller has already
//! loaded from the backend.

pub mod booking;
pub mod content;
pub mod destination;
pub mod error;
pub mod package;
pub mod page;
pub mod sort;

pub use error::{Error, Result};
