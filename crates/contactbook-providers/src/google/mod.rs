//! Google account access.
//!
//! Google only issues tokens to registered OAuth clients, so users bring
//! their own client ID and secret. The first `contactbook auth google` runs
//! the PKCE consent flow in the browser; afterwards the stored refresh token
//! keeps the access token fresh.
//!
//! ```ignore
//! use contactbook_providers::google::{GoogleConfig, GoogleTokenAcquirer, OAuthCredentials};
//! use contactbook_providers::TokenAcquirer;
//!
//! let config = GoogleConfig::new(OAuthCredentials::new(
//!     "your-client-id.apps.googleusercontent.com",
//!     "your-client-secret",
//! ));
//! let people = config.people_client()?;
//! let acquirer = GoogleTokenAcquirer::new(config)?;
//! if !acquirer.is_authenticated() {
//!     acquirer.authenticate().await?;
//! }
//! let token = acquirer.access_token().await?;
//! let contacts = people.list_contacts(&token).await?;
//! ```

mod acquirer;
mod config;
mod oauth;
mod tokens;

pub use acquirer::GoogleTokenAcquirer;
pub use config::{GoogleConfig, OAuthCredentials};
pub use oauth::{CallbackParams, OAuthClient, OAuthEndpoints, PkceFlow, RefreshedToken, parse_callback};
pub use tokens::{TokenInfo, TokenStorage};
