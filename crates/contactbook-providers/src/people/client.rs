//! Google People API client.
//!
//! This module provides a low-level HTTP client for the People API v1,
//! handling request building, status classification and response parsing.
//! The client holds no credentials: every call takes the caller's bearer
//! token, so one client can serve many users concurrently.

use std::time::Duration;

use contactbook_core::Contact;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, StatusCode};
use tracing::{debug, info, warn};

use crate::acquirer::AccessToken;
use crate::error::{PeopleError, PeopleResult};

use super::mapping::{contact_from_person, create_payload, update_payload};
use super::wire::{ListConnectionsResponse, Person, PersonField, PersonPayload};

/// Base URL for the People API v1.
pub const PEOPLE_API_BASE: &str = "https://people.googleapis.com/v1";

/// Default overall request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of an update request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The PATCH was sent and accepted.
    Updated,
    /// The payload had no field to update; no request was sent.
    NoChanges,
}

/// People API client.
#[derive(Debug, Clone)]
pub struct PeopleClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PeopleClient {
    /// Creates a client with bounded request and connect timeouts.
    pub fn new(timeout: Duration, connect_timeout: Duration) -> PeopleResult<Self> {
        Self::with_user_agent(
            timeout,
            connect_timeout,
            format!("contactbook/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Creates a client sending the given user agent.
    pub fn with_user_agent(
        timeout: Duration,
        connect_timeout: Duration,
        user_agent: impl AsRef<str>,
    ) -> PeopleResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(user_agent.as_ref())
            .build()
            .map_err(|e| PeopleError::internal(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: PEOPLE_API_BASE.to_string(),
        })
    }

    /// Points the client at another API root (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Returns the API root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lists the signed-in user's contacts, in API order.
    ///
    /// Follows `nextPageToken` until the last page, or until the server hands
    /// back the token it was just given. A response without a
    /// `connections` array is an empty page, not an error.
    pub async fn list_contacts(&self, token: &AccessToken) -> PeopleResult<Vec<Contact>> {
        let url = format!("{}/people/me/connections", self.base_url);
        let person_fields = PersonField::join(&PersonField::ALL);
        let mut contacts = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http_client
                .get(&url)
                .bearer_auth(token.secret())
                .query(&[("personFields", person_fields.as_str())]);

            if let Some(ref page) = page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let body = self.send(request, "people/me/connections").await?;
            let page: ListConnectionsResponse = parse_json(&body)?;

            contacts.extend(
                page.connections
                    .unwrap_or_default()
                    .into_iter()
                    .map(contact_from_person),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    warn!(page_token = %next, "server repeated the page token, stopping");
                    break;
                }
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        debug!("fetched {} contacts", contacts.len());
        Ok(contacts)
    }

    /// Fetches one contact, e.g. to populate an edit form.
    pub async fn get_contact(
        &self,
        token: &AccessToken,
        resource_name: &str,
    ) -> PeopleResult<Contact> {
        let resource_name = require_resource_name(Some(resource_name), "load")?;
        self.get_person(token, resource_name).await
    }

    /// Fetches the signed-in user's own profile.
    pub async fn get_profile(&self, token: &AccessToken) -> PeopleResult<Contact> {
        self.get_person(token, "people/me").await
    }

    /// Creates a contact from every non-empty field of `contact`.
    pub async fn create_contact(&self, token: &AccessToken, contact: &Contact) -> PeopleResult<()> {
        let url = format!("{}/people:createContact", self.base_url);
        let payload = create_payload(contact);

        let request = self
            .http_client
            .post(&url)
            .bearer_auth(token.secret())
            .header(CONTENT_TYPE, "application/json")
            .body(to_json(&payload)?);

        let body = self.send(request, "people:createContact").await?;

        let created = serde_json::from_str::<Person>(&body)
            .ok()
            .and_then(|p| p.resource_name);
        info!(resource_name = ?created, "created contact");
        Ok(())
    }

    /// Updates every maskable field of an existing contact.
    pub async fn update_contact(
        &self,
        token: &AccessToken,
        contact: &Contact,
    ) -> PeopleResult<UpdateOutcome> {
        self.update_contact_fields(token, contact, &PersonField::ALL)
            .await
    }

    /// Updates the selected fields of an existing contact.
    ///
    /// The update mask lists the fields present in the outgoing payload. When
    /// no field is present nothing is sent and [`UpdateOutcome::NoChanges`]
    /// is returned.
    pub async fn update_contact_fields(
        &self,
        token: &AccessToken,
        contact: &Contact,
        fields: &[PersonField],
    ) -> PeopleResult<UpdateOutcome> {
        let resource_name = require_resource_name(contact.resource_name(), "update")?;
        let payload: PersonPayload = update_payload(contact, fields);

        let Some(mask) = payload.update_mask() else {
            debug!(resource_name, "no fields to update, skipping request");
            return Ok(UpdateOutcome::NoChanges);
        };

        let url = format!("{}/{}:updateContact", self.base_url, resource_name);
        debug!(resource_name, update_person_fields = %mask, "updating contact");

        let request = self
            .http_client
            .patch(&url)
            .bearer_auth(token.secret())
            .query(&[("updatePersonFields", mask.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(to_json(&payload)?);

        self.send(request, resource_name).await?;
        info!(resource_name, "updated contact");
        Ok(UpdateOutcome::Updated)
    }

    /// Deletes a contact.
    pub async fn delete_contact(&self, token: &AccessToken, resource_name: &str) -> PeopleResult<()> {
        let resource_name = require_resource_name(Some(resource_name), "delete")?;
        let url = format!("{}/{}:deleteContact", self.base_url, resource_name);

        let request = self.http_client.delete(&url).bearer_auth(token.secret());
        self.send(request, resource_name).await?;

        info!(resource_name, "deleted contact");
        Ok(())
    }

    async fn get_person(&self, token: &AccessToken, resource_name: &str) -> PeopleResult<Contact> {
        let url = format!("{}/{}", self.base_url, resource_name);

        let request = self
            .http_client
            .get(&url)
            .bearer_auth(token.secret())
            .query(&[("personFields", PersonField::join(&PersonField::ALL))]);

        let body = self.send(request, resource_name).await?;
        let person: Person = parse_json(&body)?;
        Ok(contact_from_person(person))
    }

    /// Sends a request and classifies the answer.
    ///
    /// Returns the response body on success. `resource` names the target in
    /// a [`PeopleError::NotFound`].
    async fn send(&self, request: RequestBuilder, resource: &str) -> PeopleResult<String> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                PeopleError::transport_with("request timeout", e)
            } else if e.is_connect() {
                PeopleError::transport(format!("connection failed: {}", e))
            } else {
                PeopleError::transport_with("request failed", e)
            }
        })?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(PeopleError::NotFound(resource.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "People API error");
            return Err(PeopleError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| PeopleError::transport_with("failed to read response", e))
    }
}

fn require_resource_name<'a>(
    resource_name: Option<&'a str>,
    operation: &'static str,
) -> PeopleResult<&'a str> {
    resource_name
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or(PeopleError::MissingResourceName(operation))
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> PeopleResult<T> {
    serde_json::from_str(body)
        .map_err(|e| PeopleError::transport_with("failed to parse response", e))
}

fn to_json(payload: &PersonPayload) -> PeopleResult<String> {
    serde_json::to_string(payload)
        .map_err(|e| PeopleError::transport_with("failed to serialize request", e))
}
