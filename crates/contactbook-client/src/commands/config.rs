//! Configuration commands.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret::SecretRef;

/// Prints the effective configuration. Plain-text client secrets are masked.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    println!("# {}", config_path.display());
    println!("{}", render(config)?);
    Ok(())
}

fn render(config: &ClientConfig) -> ClientResult<String> {
    let mut shown = config.clone();
    if let Some(secret) = shown
        .google
        .as_mut()
        .and_then(|g| g.client_secret.as_mut())
        .filter(|s| !SecretRef::parse(s.as_str()).is_reference())
    {
        *secret = "********".to_string();
    }

    toml::to_string_pretty(&shown)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))
}

/// Checks that the configuration can be used.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    if config.display.max_name_length == Some(0) {
        return Err(ClientError::Config(
            "display.max_name_length must be greater than zero".into(),
        ));
    }

    match config.google {
        Some(ref google) => {
            let google_config = google
                .to_google_config()
                .map_err(|e| ClientError::Config(format!("invalid [google] table: {}", e)))?;
            google_config.validate().map_err(ClientError::Config)?;
            println!("Google credentials are valid.");
            println!("Tokens: {}", google_config.token_path.display());
        }
        None => println!("No [google] table; run 'contactbook auth google' to set one up."),
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Prints the configuration file path.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
