//! Authentication implementations
//!
//! Static credentials (basic, bearer, api key) and the session-refresh
//! token-exchange flow.

mod authenticator;
mod types;


pub use authenticator::Authenticator;
pub use types::{AuthConfig, CachedToken, Location, TokenCache};
