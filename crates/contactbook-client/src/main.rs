//! contactbook CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use contactbook_client::actions::FlashLevel;
use contactbook_client::cli::{AuthProvider, Cli, Command, ConfigAction};
use contactbook_client::commands::auth::GoogleAuthArgs;
use contactbook_client::commands::contacts::{self, Outcome};
use contactbook_client::commands::{self as cmd, Session};
use contactbook_client::config::ClientConfig;
use contactbook_client::error::{ClientError, ClientResult};
use contactbook_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tracing = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing.with_format(config.log_format)) {
        eprintln!("warning: {}", e);
    }

    match run(cli, &config, config_path).await {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(Outcome::Output(text))) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Ok(Some(Outcome::Flash(flash))) => match flash.level {
            FlashLevel::Error => {
                eprintln!("{}", flash);
                ExitCode::FAILURE
            }
            FlashLevel::Success | FlashLevel::Info => {
                println!("{}", flash);
                ExitCode::SUCCESS
            }
        },
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)
}

async fn run(cli: Cli, config: &ClientConfig, config_path: PathBuf) -> ClientResult<Option<Outcome>> {
    let access_token = cli.access_token.as_deref();

    match cli.command {
        Command::Auth { provider } => match provider {
            AuthProvider::Google {
                client_id,
                client_secret,
                credentials_file,
                account,
                force,
            } => {
                let args = GoogleAuthArgs {
                    client_id,
                    client_secret,
                    credentials_file,
                    account,
                    force,
                };
                cmd::auth::google(args, config, &config_path).await?;
                Ok(None)
            }
        },
        Command::Logout => {
            cmd::auth::logout(config).await?;
            Ok(None)
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Dump => cmd::config::dump(config, &config_path)?,
                ConfigAction::Validate => cmd::config::validate(config)?,
                ConfigAction::Path => cmd::config::path(&config_path)?,
            }
            Ok(None)
        }
        Command::Whoami => {
            let session = Session::open(config, access_token).await?;
            Ok(Some(contacts::whoami(&session).await))
        }
        Command::List { json } => {
            let session = Session::open(config, access_token).await?;
            contacts::list(&session, config, json).await.map(Some)
        }
        Command::Show {
            resource_name,
            json,
        } => {
            let session = Session::open(config, access_token).await?;
            contacts::show(&session, config, &resource_name, json)
                .await
                .map(Some)
        }
        Command::Add { fields } => {
            let session = Session::open(config, access_token).await?;
            Ok(Some(contacts::add(&session, &fields).await))
        }
        Command::Edit {
            resource_name,
            fields,
            clear_emails,
            clear_phones,
        } => {
            let session = Session::open(config, access_token).await?;
            Ok(Some(
                contacts::edit(&session, &resource_name, &fields, clear_emails, clear_phones)
                    .await,
            ))
        }
        Command::Delete { resource_name } => {
            let session = Session::open(config, access_token).await?;
            Ok(Some(contacts::delete(&session, &resource_name).await))
        }
    }
}
