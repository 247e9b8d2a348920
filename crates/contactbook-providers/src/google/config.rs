//! Google account configuration: OAuth credentials, token storage, timeouts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{PeopleError, PeopleResult};
use crate::people::{DEFAULT_CONNECT_TIMEOUT, PEOPLE_API_BASE, PeopleClient};

/// OAuth 2.0 client credentials registered in the Google Cloud Console.
///
/// Google only issues tokens to registered applications, so every user
/// brings their own client ID and secret.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// A credentials JSON file as downloaded from the Cloud Console.
///
/// Desktop clients nest the values under `installed`, web clients under
/// `web`. Tools such as gcloud write them flat at the root.
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: Option<ClientSection>,
    web: Option<ClientSection>,
    client_id: Option<String>,
    client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads credentials from a Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> PeopleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PeopleError::configuration(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Parses credentials in any of the supported layouts.
    pub fn from_json(json: &str) -> PeopleResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            PeopleError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        if let Some(section) = file.installed.or(file.web) {
            return Ok(Self::new(section.client_id, section.client_secret));
        }

        match (file.client_id, file.client_secret) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(PeopleError::configuration(
                "credentials file needs an 'installed' or 'web' section, \
                 or 'client_id' and 'client_secret' at the root",
            )),
        }
    }

    /// Checks that the credentials look like Google OAuth client credentials.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for a Google account used with the People API.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Account name for multi-account support.
    ///
    /// Used to keep tokens of several Google accounts apart.
    /// Defaults to `"default"`.
    pub account_name: String,

    /// OAuth credentials for API access.
    pub credentials: OAuthCredentials,

    /// Path to store OAuth tokens.
    ///
    /// Defaults to `~/.local/share/contactbook/google-tokens-{account}.json`.
    pub token_path: PathBuf,

    /// Overall request timeout.
    pub timeout: Duration,

    /// Connect timeout. A hung upstream must not stall a request forever.
    pub connect_timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Port range for the loopback OAuth server.
    ///
    /// The OAuth flow will try to bind to ports in this range.
    /// Defaults to (8080, 8090).
    pub loopback_port_range: (u16, u16),

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/contacts"]`.
    pub scopes: Vec<String>,

    /// People API root. Only changed by tests.
    pub api_base_url: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default OAuth scope for read/write contacts access.
    pub const DEFAULT_SCOPE: &'static str = "https://www.googleapis.com/auth/contacts";

    /// Creates a new Google configuration with the given credentials.
    pub fn new(credentials: OAuthCredentials) -> Self {
        Self {
            account_name: "default".to_string(),
            credentials,
            token_path: Self::default_token_path("default"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: format!("contactbook/{}", env!("CARGO_PKG_VERSION")),
            loopback_port_range: (8080, 8090),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            api_base_url: PEOPLE_API_BASE.to_string(),
        }
    }

    /// Returns the default token storage path for a given account name.
    pub fn default_token_path(account_name: &str) -> PathBuf {
        let data_dir = dirs::home_dir()
            .map(|h| h.join(".local").join("share"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contactbook");
        data_dir.join(format!("google-tokens-{}.json", account_name))
    }

    /// Sets the account name.
    pub fn with_account_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        // Follow the account name only while the path is still the default
        let old_default = Self::default_token_path(&self.account_name);
        if self.token_path == old_default {
            self.token_path = Self::default_token_path(&name);
        }
        self.account_name = name;
        self
    }

    /// Returns the acquirer name for this account (e.g. `"google:work"`).
    pub fn acquirer_name(&self) -> String {
        format!("google:{}", self.account_name)
    }

    /// Sets the token storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the loopback port range for OAuth.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Sets the People API root.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Builds a People API client honouring this configuration.
    pub fn people_client(&self) -> PeopleResult<PeopleClient> {
        Ok(
            PeopleClient::with_user_agent(self.timeout, self.connect_timeout, &self.user_agent)?
                .with_base_url(&self.api_base_url),
        )
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err("invalid loopback port range".to_string());
        }

        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err("timeouts must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_credentials() -> OAuthCredentials {
        OAuthCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    #[test]
    fn credentials_validation() {
        let valid = test_credentials();
        assert!(valid.validate().is_ok());

        let empty_id = OAuthCredentials::new("", "secret");
        assert!(empty_id.validate().is_err());

        let bad_id = OAuthCredentials::new("bad-id", "secret");
        assert!(bad_id.validate().is_err());

        let empty_secret = OAuthCredentials::new("test.apps.googleusercontent.com", "");
        assert!(empty_secret.validate().is_err());
    }

    #[test]
    fn config_creation() {
        let config = GoogleConfig::new(test_credentials());
        assert_eq!(config.account_name, "default");
        assert_eq!(config.api_base_url, PEOPLE_API_BASE);
        assert_eq!(config.scopes, vec![GoogleConfig::DEFAULT_SCOPE.to_string()]);
        assert!(config.token_path.ends_with("contactbook/google-tokens-default.json"));
    }

    #[test]
    fn account_name_moves_default_token_path() {
        let config = GoogleConfig::new(test_credentials()).with_account_name("work");
        assert_eq!(config.acquirer_name(), "google:work");
        assert!(config.token_path.ends_with("google-tokens-work.json"));

        let pinned = GoogleConfig::new(test_credentials())
            .with_token_path("/tmp/pinned.json")
            .with_account_name("work");
        assert_eq!(pinned.token_path, PathBuf::from("/tmp/pinned.json"));
    }

    #[test]
    fn people_client_uses_configured_base_url() {
        let config =
            GoogleConfig::new(test_credentials()).with_api_base_url("http://127.0.0.1:9/v1/");
        let client = config.people_client().unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/v1");
    }

    #[test]
    fn config_validation() {
        let config = GoogleConfig::new(test_credentials());
        assert!(config.validate().is_ok());

        let bad_config = GoogleConfig::new(test_credentials()).with_scopes(vec![]);
        assert!(bad_config.validate().is_err());

        let zero_timeout = GoogleConfig::new(test_credentials()).with_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn config_builder_methods() {
        let config = GoogleConfig::new(test_credentials())
            .with_timeout(Duration::from_secs(60))
            .with_connect_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent")
            .with_loopback_port_range(9000, 9010);

        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.loopback_port_range, (9000, 9010));
    }

    #[test]
    fn credentials_from_json_installed() {
        let json = r#"{
            "installed": {
                "client_id": "test-id.apps.googleusercontent.com",
                "client_secret": "test-secret",
                "project_id": "my-project"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    fn credentials_from_json_web() {
        let json = r#"{
            "web": {
                "client_id": "web-id.apps.googleusercontent.com",
                "client_secret": "web-secret"
            }
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "web-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "web-secret");
    }

    #[test]
    fn credentials_from_json_flat() {
        // Format used by gcloud and other tools
        let json = r#"{
            "client_id": "flat-id.apps.googleusercontent.com",
            "client_secret": "flat-secret",
            "token": "some-token",
            "refresh_token": "some-refresh-token"
        }"#;

        let creds = OAuthCredentials::from_json(json).unwrap();
        assert_eq!(creds.client_id, "flat-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "flat-secret");
    }

    #[test]
    fn credentials_from_json_invalid() {
        let json = r#"{ "other": {} }"#;
        let err = OAuthCredentials::from_json(json).unwrap_err();
        assert!(matches!(err, PeopleError::Configuration(_)));
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn credentials_from_missing_file() {
        let err = OAuthCredentials::from_file("/nonexistent/contactbook/creds.json").unwrap_err();
        assert!(err.to_string().contains("failed to read credentials file"));
    }

    #[test]
    fn credentials_from_json_malformed() {
        let json = "not json";
        let err = OAuthCredentials::from_json(json).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
