//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// contactbook - your Google contacts from the terminal
#[derive(Debug, Parser)]
#[command(name = "contactbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "CONTACTBOOK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Use this access token instead of the stored Google tokens
    ///
    /// Handy with `gcloud auth print-access-token`.
    #[arg(long, global = true, env = "CONTACTBOOK_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// Revoke and forget the stored Google tokens
    Logout,

    /// Show the signed-in Google account
    Whoami,

    /// List contacts
    List {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one contact
    Show {
        /// Resource name, e.g. people/c123
        resource_name: String,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a contact
    Add {
        #[command(flatten)]
        fields: ContactArgs,
    },

    /// Update a contact
    ///
    /// Only the fields given on the command line are sent. Emails and phones
    /// replace the existing list.
    Edit {
        /// Resource name, e.g. people/c123
        resource_name: String,

        #[command(flatten)]
        fields: ContactArgs,

        /// Remove every email address
        #[arg(long, conflicts_with = "email")]
        clear_emails: bool,

        /// Remove every phone number
        #[arg(long, conflicts_with = "phone")]
        clear_phones: bool,
    },

    /// Delete a contact
    Delete {
        /// Resource name, e.g. people/c123
        resource_name: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Contact fields shared by `add` and `edit`.
#[derive(Debug, Clone, Default, Args)]
pub struct ContactArgs {
    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    /// Email address as VALUE or VALUE:TYPE (repeatable)
    #[arg(long, action = clap::ArgAction::Append)]
    pub email: Vec<String>,

    /// Phone number as VALUE or VALUE:TYPE (repeatable)
    #[arg(long, action = clap::ArgAction::Append)]
    pub phone: Vec<String>,
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Authenticate with Google
    Google {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
        client_secret: Option<String>,

        /// Path to the OAuth client JSON downloaded from Google Cloud Console
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Account name, to keep tokens of several accounts apart
        #[arg(long)]
        account: Option<String>,

        /// Force re-authentication even if already authenticated
        #[arg(long, short)]
        force: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
