//! # authstash-session
//!
//! Session credential lifecycle for AuthStash.
//!
//! ## Modules
//!
//! - `token`: issuance input, the credential bundle, derived session state
//!   and the [`TokenService`] that persists and reads it
//! - `events`: the best-effort [`SessionEvents`] broadcast shared between
//!   service instances of one profile

pub mod events;
pub mod token;

pub use events::SessionEvents;
pub use token::{
    ChannelStatus, IssuanceResponse, PersistOutcome, SessionState, TokenBundle, TokenService,
    UserInfo,
};
