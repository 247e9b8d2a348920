//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod contacts;

use contactbook_providers::google::GoogleTokenAcquirer;
use contactbook_providers::{
    AccessToken, DEFAULT_CONNECT_TIMEOUT, PeopleClient, StaticTokenAcquirer, TokenAcquirer,
};
use tracing::debug;

use crate::actions::ContactActions;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// A People API client paired with the signed-in user's token.
pub struct Session {
    client: PeopleClient,
    token: AccessToken,
    acquirer_name: String,
}

impl Session {
    /// Signs in with an explicit access token or with the stored Google tokens.
    pub async fn open(config: &ClientConfig, access_token: Option<&str>) -> ClientResult<Self> {
        let (client, acquirer): (PeopleClient, Box<dyn TokenAcquirer>) = match access_token {
            Some(token) => (
                PeopleClient::new(config.timeout(), DEFAULT_CONNECT_TIMEOUT)?,
                Box::new(StaticTokenAcquirer::new(token)) as Box<dyn TokenAcquirer>,
            ),
            None => {
                let google = config
                    .google
                    .as_ref()
                    .ok_or_else(|| {
                        ClientError::AuthRequired(
                            "Google is not configured - run 'contactbook auth google'".into(),
                        )
                    })?
                    .to_google_config()
                    .map_err(ClientError::Config)?;
                (
                    google.people_client()?,
                    Box::new(GoogleTokenAcquirer::new(google)?) as Box<dyn TokenAcquirer>,
                )
            }
        };

        Self::with_acquirer(client, acquirer.as_ref()).await
    }

    /// Fetches a token from `acquirer` for use with `client`.
    pub async fn with_acquirer(
        client: PeopleClient,
        acquirer: &dyn TokenAcquirer,
    ) -> ClientResult<Self> {
        debug!(acquirer = acquirer.name(), "acquiring access token");
        let token = acquirer
            .access_token()
            .await
            .map_err(ClientError::from_token_error)?;

        Ok(Self {
            client,
            token,
            acquirer_name: acquirer.name().to_string(),
        })
    }

    pub fn actions(&self) -> ContactActions<'_> {
        ContactActions::new(&self.client, &self.token)
    }

    pub fn acquirer_name(&self) -> &str {
        &self.acquirer_name
    }
}
