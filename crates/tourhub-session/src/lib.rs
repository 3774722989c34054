//! Client-side session state for TourHub.
//!
//! [`SessionStore`] tracks who is signed in, resolves their profile in the
//! background and exposes credential operations. It is generic over any
//! [`AuthBackend`](tourhub_core::backend::AuthBackend).

mod store;

pub mod gate;
pub mod messages;
pub mod state;

pub use gate::{Access, Gate};
pub use state::{AuthState, ProfileState};
pub use store::{SessionConfig, SessionStore};
