//! Client configuration.
//!
//! Everything lives in one `config.toml`, by default at
//! `~/.config/contactbook/config.toml`:
//!
//! ```toml
//! log_format = "json"
//!
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! client_secret = "pass::google/contactbook"
//! account = "work"
//! timeout_secs = 20
//!
//! [display]
//! json = false
//! max_name_length = 40
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use contactbook_core::{FormatOptions, TracingOutputFormat};
use contactbook_providers::google::{GoogleConfig, OAuthCredentials};
use serde::{Deserialize, Serialize};

use crate::secret;

/// Configuration for the contactbook client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug logging.
    pub debug: bool,

    /// `compact` (default) or `json`.
    pub log_format: TracingOutputFormat,

    /// Google account settings.
    pub google: Option<GoogleSettings>,

    pub display: DisplaySettings,
}

/// How contacts are printed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Print JSON instead of text.
    pub json: bool,

    /// Truncate names longer than this.
    pub max_name_length: Option<usize>,

    /// Prefix list lines with the resource name.
    pub show_resource_names: bool,

    /// Shown for contacts without a name.
    pub no_name_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            json: false,
            max_name_length: None,
            show_resource_names: true,
            no_name_text: "(no name)".to_string(),
        }
    }
}

impl DisplaySettings {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            max_name_length: self.max_name_length,
            no_name_text: self.no_name_text.clone(),
            show_resource_names: self.show_resource_names,
        }
    }
}

impl ClientConfig {
    /// Loads the default file, or the defaults when it does not exist.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse {}: {}", path.display(), e))
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("contactbook")
            .join("config.toml")
    }

    /// Request timeout for People API calls.
    pub fn timeout(&self) -> Duration {
        self.google
            .as_ref()
            .and_then(|g| g.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(contactbook_providers::DEFAULT_TIMEOUT)
    }
}

/// The `[google]` table.
///
/// `client_id` and `client_secret` accept secret references
/// (see [`crate::secret`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    /// Keeps the tokens of several Google accounts apart.
    pub account: Option<String>,

    pub token_path: Option<PathBuf>,

    /// Overall request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl GoogleSettings {
    /// Resolves credentials and builds the account configuration.
    pub fn to_google_config(&self) -> Result<GoogleConfig, String> {
        let credentials = self.resolve_credentials()?;
        credentials.validate().map_err(str::to_string)?;
        Ok(self.apply(GoogleConfig::new(credentials)))
    }

    /// Applies account, token path and timeout on top of `config`.
    pub fn apply(&self, mut config: GoogleConfig) -> GoogleConfig {
        if let Some(ref account) = self.account {
            config = config.with_account_name(account);
        }
        if let Some(ref path) = self.token_path {
            config = config.with_token_path(path);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Resolves `client_id` and `client_secret`, expanding secret references.
    pub fn resolve_credentials(&self) -> Result<OAuthCredentials, String> {
        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            format!(
                "Google credentials not found. Add to {}:\n  \
                 [google]\n  \
                 client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
                 client_secret = \"YOUR_SECRET\"\n\n  \
                 Or run: contactbook auth google --credentials-file <path>",
                ClientConfig::default_path().display()
            )
        })?;
        let raw_secret = self
            .client_secret
            .as_deref()
            .ok_or("client_secret is missing from the [google] table")?;

        let client_id =
            secret::resolve(raw_id).map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let client_secret = secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(client_id, client_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(id: &str, secret: &str) -> GoogleSettings {
        GoogleSettings {
            client_id: Some(id.to_string()),
            client_secret: Some(secret.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert!(config.google.is_none());
        assert_eq!(config.log_format, TracingOutputFormat::Compact);
        assert!(!config.display.json);
        assert!(config.display.show_resource_names);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn full_file_parses() {
        let config: ClientConfig = toml::from_str(
            r#"
debug = true
log_format = "json"

[google]
client_id = "id.apps.googleusercontent.com"
client_secret = "secret"
account = "work"
timeout_secs = 5

[display]
json = true
max_name_length = 20
"#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.log_format, TracingOutputFormat::Json);
        assert!(config.display.json);
        assert_eq!(config.display.format_options().max_name_length, Some(20));
        assert_eq!(config.timeout(), Duration::from_secs(5));

        let google = config.google.unwrap().to_google_config().unwrap();
        assert_eq!(google.account_name, "work");
        assert_eq!(google.acquirer_name(), "google:work");
        assert!(google.token_path.ends_with("google-tokens-work.json"));
        assert_eq!(google.timeout, Duration::from_secs(5));
    }

    #[test]
    fn unknown_log_format_is_rejected() {
        assert!(toml::from_str::<ClientConfig>("log_format = \"pretty\"").is_err());
    }

    #[test]
    fn load_from_missing_file_errors() {
        let err = ClientConfig::load_from(Path::new("/nonexistent/contactbook.toml")).unwrap_err();
        assert!(err.contains("failed to read"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[display]\nno_name_text = \"?\"\n").unwrap();
        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.display.no_name_text, "?");
    }

    #[test]
    fn plain_credentials() {
        let creds = settings("id.apps.googleusercontent.com", "secret")
            .resolve_credentials()
            .unwrap();
        assert_eq!(creds.client_id, "id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "secret");
    }

    #[test]
    fn env_reference_credentials() {
        unsafe {
            std::env::set_var("_CONTACTBOOK_CFG_ID", "env-id.apps.googleusercontent.com");
            std::env::set_var("_CONTACTBOOK_CFG_SECRET", "env-secret");
        }
        let creds = settings("env::_CONTACTBOOK_CFG_ID", "env::_CONTACTBOOK_CFG_SECRET")
            .resolve_credentials()
            .unwrap();
        assert_eq!(creds.client_id, "env-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "env-secret");
        unsafe {
            std::env::remove_var("_CONTACTBOOK_CFG_ID");
            std::env::remove_var("_CONTACTBOOK_CFG_SECRET");
        }
    }

    #[test]
    fn missing_credentials_error() {
        let err = GoogleSettings::default().resolve_credentials().unwrap_err();
        assert!(err.contains("credentials not found"));

        let err = GoogleSettings {
            client_id: Some("id.apps.googleusercontent.com".into()),
            ..Default::default()
        }
        .resolve_credentials()
        .unwrap_err();
        assert!(err.contains("client_secret"));
    }

    #[test]
    fn invalid_client_id_is_rejected() {
        let err = settings("not-a-google-id", "secret")
            .to_google_config()
            .unwrap_err();
        assert!(err.contains("googleusercontent"));
    }

    #[test]
    fn explicit_token_path_wins() {
        let google = GoogleSettings {
            account: Some("work".into()),
            token_path: Some(PathBuf::from("/tmp/cb/tokens.json")),
            ..settings("id.apps.googleusercontent.com", "secret")
        }
        .to_google_config()
        .unwrap();
        assert_eq!(google.token_path, PathBuf::from("/tmp/cb/tokens.json"));
    }
}
