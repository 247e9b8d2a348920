//! The local contact model.
//!
//! A [`Contact`] is built fresh for every request, either from user input or
//! from a People API response, and is never persisted locally. The remote
//! API is the system of record.

use serde::{Deserialize, Serialize};

/// A typed value attached to a contact (an email address or phone number).
///
/// The `kind` mirrors the People API `type` field ("home", "work",
/// "mobile", ...). It is free-form and optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactField {
    /// The address or number itself.
    pub value: String,
    /// Optional classification such as "home" or "work".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ContactField {
    /// Creates a field without a kind.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: None,
        }
    }

    /// Builder method to set the kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Parses `VALUE[:KIND]`, as accepted on the command line.
    ///
    /// Only the last colon separates the kind, so `sip:alice@example.com:work`
    /// keeps its scheme. An empty kind is dropped.
    pub fn parse(input: &str) -> Self {
        match input.rsplit_once(':') {
            Some((value, kind)) if !value.is_empty() && !kind.contains('@') => {
                let field = Self::new(value.trim());
                let kind = kind.trim();
                if kind.is_empty() {
                    field
                } else {
                    field.with_kind(kind)
                }
            }
            _ => Self::new(input.trim()),
        }
    }

    /// Returns true if the value is empty and the entry must not be sent.
    pub fn is_blank(&self) -> bool {
        self.value.is_empty()
    }
}

/// A person in the user's address book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Remote identifier (e.g. `people/c123`). `None` until created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    /// Version tag for optimistic concurrency, echoed back on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email_addresses: Vec<ContactField>,
    #[serde(default)]
    pub phone_numbers: Vec<ContactField>,
}

impl Contact {
    /// Creates an empty, not-yet-created contact.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the resource name.
    pub fn with_resource_name(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = Some(resource_name.into());
        self
    }

    /// Builder method to set the etag.
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Builder method to set the first name.
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Builder method to set the last name.
    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    /// Builder method to append an email address.
    pub fn with_email(mut self, email: ContactField) -> Self {
        self.email_addresses.push(email);
        self
    }

    /// Builder method to append a phone number.
    pub fn with_phone(mut self, phone: ContactField) -> Self {
        self.phone_numbers.push(phone);
        self
    }

    /// Returns true if the contact has not been created remotely yet.
    ///
    /// Saving a new contact creates it; saving any other contact updates it.
    pub fn is_new(&self) -> bool {
        self.resource_name().is_none()
    }

    /// Returns the resource name, trimmed, when it is present and not blank.
    pub fn resource_name(&self) -> Option<&str> {
        non_empty(self.resource_name.as_deref().map(str::trim))
    }

    /// Returns the first name when it is present and non-empty.
    pub fn given_name(&self) -> Option<&str> {
        non_empty(self.first_name.as_deref())
    }

    /// Returns the last name when it is present and non-empty.
    pub fn family_name(&self) -> Option<&str> {
        non_empty(self.last_name.as_deref())
    }

    /// Returns the etag when it is present and non-empty.
    pub fn current_etag(&self) -> Option<&str> {
        non_empty(self.etag.as_deref())
    }

    /// Returns "First Last", omitting whichever part is empty.
    pub fn full_name(&self) -> Option<String> {
        match (self.given_name(), self.family_name()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(first), None) => Some(first.to_string()),
            (None, Some(last)) => Some(last.to_string()),
            (None, None) => None,
        }
    }

    /// Returns the first non-empty email address.
    pub fn first_email(&self) -> Option<&str> {
        first_value(&self.email_addresses)
    }

    /// Returns the first non-empty phone number.
    pub fn first_phone(&self) -> Option<&str> {
        first_value(&self.phone_numbers)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn first_value(fields: &[ContactField]) -> Option<&str> {
    fields
        .iter()
        .find(|f| !f.is_blank())
        .map(|f| f.value.as_str())
}
