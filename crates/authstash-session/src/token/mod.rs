//! Session credential bundle and its lifecycle.

pub mod bundle;
pub mod keys;
pub mod service;
pub mod state;

pub use bundle::{IssuanceResponse, TokenBundle, UserInfo, parse_roles};
pub use service::TokenService;
pub use state::{ChannelStatus, PersistOutcome, SessionState};
