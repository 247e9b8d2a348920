//! Contact actions.
//!
//! Each action runs one People API operation and reports the outcome as a
//! [`Flash`]. API failures never escape as errors: the user sees a message and
//! the command carries on.

use std::fmt;

use contactbook_core::Contact;
use contactbook_providers::{AccessToken, PeopleClient, PeopleError, PersonField, UpdateOutcome};
use tracing::{debug, warn};

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// A one-line outcome shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == FlashLevel::Error
    }
}

impl fmt::Display for Flash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Contact operations for one signed-in user.
pub struct ContactActions<'a> {
    client: &'a PeopleClient,
    token: &'a AccessToken,
}

impl<'a> ContactActions<'a> {
    pub fn new(client: &'a PeopleClient, token: &'a AccessToken) -> Self {
        Self { client, token }
    }

    /// Lists every contact.
    pub async fn list(&self) -> Result<Vec<Contact>, Flash> {
        self.client.list_contacts(self.token).await.map_err(|e| {
            warn!("listing contacts failed: {}", e);
            Flash::error(format!("Could not load contacts: {}", e))
        })
    }

    /// Loads the signed-in user's own profile.
    pub async fn profile(&self) -> Result<Contact, Flash> {
        self.client
            .get_profile(self.token)
            .await
            .map_err(|e| Flash::error(format!("Could not load profile: {}", e)))
    }

    /// Loads a contact to be edited or shown.
    pub async fn load_for_edit(&self, resource_name: &str) -> Result<Contact, Flash> {
        match self.client.get_contact(self.token, resource_name).await {
            Ok(contact) => Ok(contact),
            Err(e) if e.is_not_found() => Err(Flash::error("Contact not found for editing.")),
            Err(e) => Err(Flash::error(format!(
                "Error fetching contact for editing: {}",
                e
            ))),
        }
    }

    /// Creates the contact if it is new, otherwise updates `fields` of it.
    pub async fn save(&self, contact: &Contact, fields: &[PersonField]) -> Flash {
        if contact.is_new() {
            debug!("saving new contact");
            return match self.client.create_contact(self.token, contact).await {
                Ok(()) => Flash::success("Contact added successfully!"),
                Err(e) => save_failure(e),
            };
        }

        match self
            .client
            .update_contact_fields(self.token, contact, fields)
            .await
        {
            Ok(UpdateOutcome::Updated) => Flash::success("Contact updated successfully!"),
            Ok(UpdateOutcome::NoChanges) => Flash::info("No changes detected for contact."),
            Err(e) => save_failure(e),
        }
    }

    /// Deletes a contact.
    pub async fn delete(&self, resource_name: &str) -> Flash {
        match self.client.delete_contact(self.token, resource_name).await {
            Ok(()) => Flash::success("Contact deleted successfully!"),
            Err(PeopleError::NotFound(_)) => Flash::error("Contact not found for deletion."),
            Err(PeopleError::RemoteApi { body, .. }) => {
                Flash::error(format!("API Error deleting contact: {}", body))
            }
            Err(e) => Flash::error(format!(
                "An unexpected error occurred during deletion: {}",
                e
            )),
        }
    }
}

fn save_failure(err: PeopleError) -> Flash {
    match err {
        PeopleError::RemoteApi { body, .. } => Flash::error(format!("API Error: {}", body)),
        other => Flash::error(format!("An unexpected error occurred: {}", other)),
    }
}
