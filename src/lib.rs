//! Client library for the library-management REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` owns the single HTTP round-trip, `token_store` persists the auth
//! token, `session` tracks who is logged in, `api` maps domain nouns to
//! endpoints, and `guard` decides whether a page may be opened.
//!
//! ```text
//! caller -> api::* -> net::HttpClient -> net::Transport -> backend
//!              \-> session (login/logout/me) -> token_store
//! guard -> session
//! ```

pub mod api;
pub mod config;
pub mod guard;
pub mod net;
pub mod session;
pub mod token_store;

pub use api::{ApiError, LibraryApi};
pub use config::{ClientConfig, ConfigError};
pub use guard::{Navigation, RouteAccess, RouteGuard};
pub use net::{HttpClient, NetError};
pub use session::AuthSession;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};
