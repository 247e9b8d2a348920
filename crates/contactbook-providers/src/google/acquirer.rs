//! Token acquirer backed by the Google OAuth flow and a token file.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::acquirer::{AccessToken, BoxFuture, TokenAcquirer};
use crate::error::{PeopleError, PeopleResult};

use super::config::GoogleConfig;
use super::oauth::{OAuthClient, OAuthEndpoints};
use super::tokens::{TokenInfo, TokenStorage};

/// Hands out access tokens for one Google account.
///
/// Tokens are read from the account's token file. An expired access token is
/// refreshed with the stored refresh token and written back. Concurrent
/// callers share a single refresh.
pub struct GoogleTokenAcquirer {
    config: GoogleConfig,
    name: String,
    storage: TokenStorage,
    oauth: OAuthClient,
    refresh_lock: Mutex<()>,
}

impl GoogleTokenAcquirer {
    /// Creates an acquirer and loads any stored tokens.
    ///
    /// A missing token file is not an error: the acquirer then reports that
    /// it is not authenticated.
    pub fn new(config: GoogleConfig) -> PeopleResult<Self> {
        config.validate().map_err(PeopleError::configuration)?;

        let storage = TokenStorage::new(&config.token_path);
        if let Err(e) = storage.load() {
            warn!("ignoring unreadable token file: {}", e);
        }
        let oauth = OAuthClient::new(config.credentials.clone(), config.timeout)?;

        Ok(Self {
            name: config.acquirer_name(),
            config,
            storage,
            oauth,
            refresh_lock: Mutex::new(()),
        })
    }

    /// Talks to other OAuth endpoints.
    pub fn with_oauth_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.oauth = self.oauth.with_endpoints(endpoints);
        self
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Runs the browser consent flow and stores the granted tokens.
    pub async fn authenticate(&self) -> PeopleResult<TokenInfo> {
        info!(account = %self.config.account_name, "starting Google authentication");
        let tokens = self
            .oauth
            .authorize(&self.config.scopes, self.config.loopback_port_range)
            .await?;
        self.storage.set(tokens.clone())?;
        Ok(tokens)
    }

    /// Revokes the stored grant at Google and deletes the token file.
    ///
    /// The file is deleted even when revocation fails.
    pub async fn logout(&self) -> PeopleResult<()> {
        if let Some(tokens) = self.storage.get() {
            let token = tokens.refresh_token.unwrap_or(tokens.access_token);
            if let Err(e) = self.oauth.revoke_token(&token).await {
                warn!("failed to revoke token: {}", e);
            }
        }
        self.storage.clear()
    }

    /// Returns true if there are no tokens or they lack a configured scope.
    pub fn needs_reauth(&self) -> bool {
        self.storage.needs_reauth(&self.config.scopes)
    }

    /// Returns the stored tokens, if any.
    pub fn tokens(&self) -> Option<TokenInfo> {
        self.storage.get()
    }

    async fn current_token(&self) -> PeopleResult<AccessToken> {
        let tokens = self.stored()?;
        if !tokens.is_expired() {
            return Ok(AccessToken::new(tokens.access_token));
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        let tokens = self.stored()?;
        if !tokens.is_expired() {
            return Ok(AccessToken::new(tokens.access_token));
        }

        let refresh_token = tokens
            .refresh_token
            .filter(|r| !r.is_empty())
            .ok_or_else(|| {
                PeopleError::authentication(
                    "access token expired and no refresh token is stored - run 'contactbook auth google'",
                )
            })?;

        debug!(acquirer = %self.name, "refreshing expired access token");
        let refreshed = self.oauth.refresh_token(&refresh_token).await?;
        let updated = self.storage.update_access_token(
            refreshed.access_token,
            refreshed.refresh_token,
            refreshed.expires_in,
        )?;
        Ok(AccessToken::new(updated.access_token))
    }

    fn stored(&self) -> PeopleResult<TokenInfo> {
        self.storage.get().ok_or_else(|| {
            PeopleError::authentication("not authenticated - run 'contactbook auth google'")
        })
    }
}

impl TokenAcquirer for GoogleTokenAcquirer {
    fn name(&self) -> &str {
        &self.name
    }

    fn access_token(&self) -> BoxFuture<'_, PeopleResult<AccessToken>> {
        Box::pin(self.current_token())
    }

    fn is_authenticated(&self) -> bool {
        self.storage.has_valid_tokens() || self.storage.has_refresh_token()
    }
}
