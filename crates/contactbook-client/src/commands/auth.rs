//! Authentication commands.

use std::path::{Path, PathBuf};

use contactbook_providers::TokenAcquirer;
use contactbook_providers::google::{GoogleConfig, GoogleTokenAcquirer, OAuthCredentials};
use tracing::{info, warn};

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Where the credentials were found.
#[derive(Debug, PartialEq, Eq)]
enum CredentialSource {
    /// `--client-id`/`--client-secret` or `--credentials-file`.
    Cli,
    /// The `[google]` table, already persisted.
    Config,
}

/// Options of `contactbook auth google`.
#[derive(Debug, Default)]
pub struct GoogleAuthArgs {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub account: Option<String>,
    pub force: bool,
}

/// Runs the Google consent flow and stores the tokens.
///
/// Credentials given on the command line are written to the `[google]` table
/// of `config_path` so later commands find them.
pub async fn google(
    args: GoogleAuthArgs,
    config: &ClientConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let (credentials, source) = resolve_google_credentials(
        args.client_id,
        args.client_secret,
        args.credentials_file,
        config.google.as_ref(),
    )?;
    credentials
        .validate()
        .map_err(|e| ClientError::Config(format!("invalid Google credentials: {}", e)))?;

    let settings = config.google.clone().unwrap_or_default();
    let mut google_config = settings.apply(GoogleConfig::new(credentials.clone()));
    if let Some(account) = args.account.as_deref() {
        google_config = google_config.with_account_name(account);
    }

    let acquirer = GoogleTokenAcquirer::new(google_config)?;

    if source == CredentialSource::Cli {
        persist_credentials(config_path, &credentials, args.account.as_deref())?;
        println!("Credentials saved to {}", config_path.display());
    }

    if acquirer.is_authenticated() && !acquirer.needs_reauth() && !args.force {
        println!("Already authenticated with Google ({}).", acquirer.name());
        println!("Use --force to re-authenticate.");
        return Ok(());
    }

    println!("Starting Google authentication...");
    println!();
    println!("A browser window will open for you to authorize access to your contacts.");
    println!("If it does not, open the URL printed below.");
    println!();

    acquirer.authenticate().await?;

    info!(acquirer = acquirer.name(), "Google authentication successful");
    println!("Authentication successful!");
    println!(
        "Tokens saved to {}",
        acquirer.config().token_path.display()
    );
    Ok(())
}

/// Revokes the stored Google grant and deletes the token file.
pub async fn logout(config: &ClientConfig) -> ClientResult<()> {
    let google = config
        .google
        .as_ref()
        .ok_or_else(|| ClientError::Config("no [google] table in the configuration".into()))?
        .to_google_config()
        .map_err(ClientError::Config)?;

    let acquirer = GoogleTokenAcquirer::new(google)?;
    if acquirer.tokens().is_none() {
        println!("Not signed in.");
        return Ok(());
    }

    acquirer.logout().await?;
    println!("Signed out of Google ({}).", acquirer.name());
    Ok(())
}

/// Finds Google credentials.
///
/// Order: `--client-id` with `--client-secret`, then `--credentials-file`,
/// then the `[google]` table.
fn resolve_google_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    config_google: Option<&GoogleSettings>,
) -> ClientResult<(OAuthCredentials, CredentialSource)> {
    match (cli_client_id, cli_client_secret) {
        (Some(id), Some(secret)) => {
            return Ok((OAuthCredentials::new(id, secret), CredentialSource::Cli));
        }
        (Some(_), None) | (None, Some(_)) => {
            return Err(ClientError::Config(
                "both --client-id and --client-secret are required when providing credentials directly"
                    .into(),
            ));
        }
        (None, None) => {}
    }

    if let Some(path) = cli_credentials_file {
        let credentials = OAuthCredentials::from_file(&path)?;
        return Ok((credentials, CredentialSource::Cli));
    }

    if let Some(google) = config_google.filter(|g| g.client_id.is_some()) {
        let credentials = google
            .resolve_credentials()
            .map_err(|e| ClientError::Config(format!("failed to resolve Google credentials: {}", e)))?;
        return Ok((credentials, CredentialSource::Config));
    }

    Err(ClientError::Config(format!(
        "Google credentials are required. Provide them via:\n  \
         - client_id and client_secret in the [google] table of {}\n  \
         - --client-id and --client-secret\n  \
         - --credentials-file (OAuth client JSON from Google Cloud Console)\n  \
         - GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET",
        ClientConfig::default_path().display()
    )))
}

/// Writes credentials into the `[google]` table, keeping the rest of the file.
fn persist_credentials(
    config_path: &Path,
    credentials: &OAuthCredentials,
    account: Option<&str>,
) -> ClientResult<()> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("cannot update {}: {}", config_path.display(), e))
    })?;

    let google = doc
        .entry("google")
        .or_insert_with(|| toml_edit::Item::Table(toml_edit::Table::new()))
        .as_table_mut()
        .ok_or_else(|| {
            ClientError::Config(format!(
                "`google` in {} is not a table",
                config_path.display()
            ))
        })?;

    google["client_id"] = toml_edit::value(credentials.client_id.as_str());
    google["client_secret"] = toml_edit::value(credentials.client_secret.as_str());
    if let Some(account) = account {
        google["account"] = toml_edit::value(account);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) =
            std::fs::set_permissions(config_path, std::fs::Permissions::from_mode(0o600))
        {
            warn!("could not restrict permissions of {}: {}", config_path.display(), e);
        }
    }

    info!(path = %config_path.display(), "saved Google credentials");
    Ok(())
}
