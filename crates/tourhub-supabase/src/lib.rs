//! Hosted-backend adapter for TourHub.
//!
//! [`SupabaseClient`] speaks the GoTrue auth API and the PostgREST data API
//! of a Supabase project and implements
//! [`AuthBackend`](tourhub_core::backend::AuthBackend) on top of them.

mod client;
mod persist;

pub mod error;

pub use client::{SupabaseClient, SupabaseConfig};
pub use error::{Error, Result};
pub use persist::SessionFile;
