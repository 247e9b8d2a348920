//! OAuth 2.0 authorization code flow with PKCE for Google.
//!
//! The desktop flow:
//!
//! 1. Bind a loopback listener on the first free port of the configured range
//! 2. Open the consent page with a S256 code challenge and a random state
//! 3. Read the single redirect Google sends to `/callback`
//! 4. Exchange the code and the verifier for an access and a refresh token
//!
//! Refresh and revocation reuse the same client.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{PeopleError, PeopleResult};

use super::config::OAuthCredentials;
use super::tokens::TokenInfo;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Random bytes in a code verifier, before encoding (43 characters encoded).
const CODE_VERIFIER_BYTES: usize = 32;

/// How long to wait for the user to finish the consent page.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// The three Google OAuth endpoints.
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub revoke_url: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            revoke_url: GOOGLE_REVOKE_URL.to_string(),
        }
    }
}

/// A token endpoint answer to a refresh request.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Google OAuth client for one set of client credentials.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    endpoints: OAuthEndpoints,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(credentials: OAuthCredentials, timeout: Duration) -> PeopleResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PeopleError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            credentials,
            endpoints: OAuthEndpoints::default(),
            http_client,
        })
    }

    /// Uses other endpoints, e.g. a local mock server.
    pub fn with_endpoints(mut self, endpoints: OAuthEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Runs the interactive consent flow and returns the granted tokens.
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
    ) -> PeopleResult<TokenInfo> {
        let pkce = PkceFlow::new();
        let (listener, port) = bind_loopback(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);
        let auth_url = pkce.auth_url(
            &self.endpoints.auth_url,
            &self.credentials.client_id,
            &redirect_uri,
            scopes,
        )?;

        info!(port, "waiting for Google consent");
        debug!(url = %auth_url, "authorization URL");

        if let Err(e) = open::that(auth_url.as_str()) {
            warn!("failed to open browser: {}", e);
            eprintln!("\nOpen this URL in your browser to continue:\n\n{}\n", auth_url);
        }

        let callback = wait_for_callback(listener)?;
        if callback.state != pkce.state {
            return Err(PeopleError::authentication(
                "OAuth state mismatch, refusing the authorization code",
            ));
        }

        let response = self
            .post_token(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("code", callback.code.as_str()),
                ("code_verifier", pkce.verifier.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri.as_str()),
            ])
            .await?;

        info!("obtained Google tokens");
        let granted = match response.scope {
            Some(scope) => scope.split_whitespace().map(String::from).collect(),
            None => scopes.to_vec(),
        };
        Ok(TokenInfo::new(
            response.access_token,
            response.refresh_token,
            response.expires_in,
            granted,
        ))
    }

    /// Trades a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> PeopleResult<RefreshedToken> {
        let response = self
            .post_token(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("client_secret", self.credentials.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;

        debug!("refreshed access token");
        Ok(RefreshedToken {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expires_in: response.expires_in,
        })
    }

    /// Revokes a token at Google. Revoking a refresh token also revokes its
    /// access tokens.
    pub async fn revoke_token(&self, token: &str) -> PeopleResult<()> {
        let response = self
            .http_client
            .post(&self.endpoints.revoke_url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| PeopleError::transport_with("token revocation request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PeopleError::authentication(format!(
                "token revocation failed ({}): {}",
                status, body
            )));
        }

        info!("revoked Google token");
        Ok(())
    }

    async fn post_token(&self, params: &[(&str, &str)]) -> PeopleResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.endpoints.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| PeopleError::transport_with("token request failed", e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PeopleError::transport_with("failed to read token response", e))?;

        if !status.is_success() {
            return Err(PeopleError::authentication(format!(
                "token endpoint answered {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| PeopleError::transport_with("invalid token response", e))
    }
}

fn bind_loopback(port_range: (u16, u16)) -> PeopleResult<(TcpListener, u16)> {
    let (first, last) = port_range;
    (first..=last)
        .find_map(|port| {
            TcpListener::bind(("127.0.0.1", port))
                .ok()
                .map(|listener| (listener, port))
        })
        .ok_or_else(|| {
            PeopleError::configuration(format!("no free loopback port in {}-{}", first, last))
        })
}

/// Code and state from the OAuth redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: String,
    pub state: String,
}

fn wait_for_callback(listener: TcpListener) -> PeopleResult<CallbackParams> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            if let Some(result) = answer_callback(stream) {
                let _ = tx.send(result);
                return;
            }
        }
    });

    match rx.recv_timeout(CALLBACK_TIMEOUT) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(PeopleError::authentication(
            "timed out waiting for the OAuth redirect",
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(PeopleError::internal("OAuth callback listener stopped"))
        }
    }
}

fn answer_callback(mut stream: TcpStream) -> Option<PeopleResult<CallbackParams>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line).ok()?;

    let result = parse_callback(&request_line)?;

    let (status, message) = match result {
        Ok(_) => ("200 OK", "Contactbook is authorized. You can close this window."),
        Err(_) => ("400 Bad Request", "Authorization failed. You can close this window."),
    };
    let page = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
         <html><body><p>{}</p></body></html>",
        status, message
    );
    let _ = stream.write_all(page.as_bytes());
    let _ = stream.flush();

    Some(result)
}

/// Parses the request line of the redirect.
///
/// Returns `None` for requests that are not the callback (favicon probes and
/// the like), so the listener keeps waiting.
pub fn parse_callback(request_line: &str) -> Option<PeopleResult<CallbackParams>> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let url = Url::parse(&format!("http://127.0.0.1{}", target)).ok()?;
    if url.path() != "/callback" {
        return None;
    }

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        return Some(Err(PeopleError::authentication(format!(
            "authorization denied: {}",
            error
        ))));
    }

    Some(match code {
        Some(code) => Ok(CallbackParams {
            code,
            state: state.unwrap_or_default(),
        }),
        None => Err(PeopleError::authentication(
            "OAuth redirect carried no authorization code",
        )),
    })
}

/// PKCE verifier, challenge and state (RFC 7636).
#[derive(Debug)]
pub struct PkceFlow {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
}

impl PkceFlow {
    pub fn new() -> Self {
        let verifier = random_token(CODE_VERIFIER_BYTES);
        Self {
            challenge: challenge_for(&verifier),
            verifier,
            state: random_token(16),
        }
    }

    /// Builds the consent page URL.
    pub fn auth_url(
        &self,
        base: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> PeopleResult<Url> {
        let mut url = Url::parse(base).map_err(|e| {
            PeopleError::configuration(format!("invalid authorization URL {}: {}", base, e))
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("code_challenge", &self.challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", &self.state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent");
        Ok(url)
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

fn random_token(len: usize) -> String {
    let mut rng = rand::rng();
    let bytes: Vec<u8> = (0..len).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
