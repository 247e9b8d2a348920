//! Output formatting for contacts.
//!
//! This module renders contacts for the terminal or as machine-readable JSON:
//! - **TTY**: one line per contact, or a detail block for a single contact
//! - **JSON**: a stable document with every mapped field
//!
//! # Example
//!
//! ```rust
//! use contactbook_core::format::{ContactFormatter, FormatOptions};
//! use contactbook_core::Contact;
//!
//! let formatter = ContactFormatter::new(FormatOptions::default());
//! let lines = formatter.format_tty(&[Contact::new().with_first_name("Ana")]);
//! assert_eq!(lines, vec!["Ana".to_string()]);
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactField};

/// Configuration options for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Maximum length for display names (truncated with ellipsis).
    pub max_name_length: Option<usize>,
    /// Text shown for contacts with neither first nor last name.
    pub no_name_text: String,
    /// Whether to prefix each TTY line with the resource name.
    pub show_resource_names: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_name_length: None,
            no_name_text: "(no name)".to_string(),
            show_resource_names: false,
        }
    }
}

/// JSON output format for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// The formatted contacts, in API order.
    pub contacts: Vec<JsonContact>,
    /// Number of contacts returned.
    pub count: usize,
}

/// A single contact in JSON format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Display name ("First Last"), if any part is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub emails: Vec<ContactField>,
    pub phones: Vec<ContactField>,
}

/// Output formatter for contacts.
#[derive(Debug, Clone)]
pub struct ContactFormatter {
    options: FormatOptions,
}

impl ContactFormatter {
    /// Creates a new formatter with the given options.
    pub fn new(options: FormatOptions) -> Self {
        Self { options }
    }

    /// Creates a new formatter with default options.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default())
    }

    /// Formats contacts as one terminal line each.
    pub fn format_tty(&self, contacts: &[Contact]) -> Vec<String> {
        contacts.iter().map(|c| self.format_line(c)).collect()
    }

    /// Formats a single contact as a multi-line detail block.
    pub fn format_detail(&self, contact: &Contact) -> String {
        let mut lines = vec![format!("Name: {}", self.display_name(contact))];

        if let Some(resource_name) = contact.resource_name() {
            lines.push(format!("Resource: {}", resource_name));
        }

        for email in contact.email_addresses.iter().filter(|e| !e.is_blank()) {
            lines.push(format!("Email: {}", describe_field(email)));
        }

        for phone in contact.phone_numbers.iter().filter(|p| !p.is_blank()) {
            lines.push(format!("Phone: {}", describe_field(phone)));
        }

        lines.join("\n")
    }

    /// Formats contacts for JSON output.
    pub fn format_json(&self, contacts: &[Contact]) -> JsonOutput {
        let contacts: Vec<JsonContact> = contacts.iter().map(to_json_contact).collect();
        JsonOutput {
            count: contacts.len(),
            contacts,
        }
    }

    fn format_line(&self, contact: &Contact) -> String {
        let mut parts = Vec::new();

        if self.options.show_resource_names {
            parts.push(contact.resource_name().unwrap_or("-").to_string());
        }

        parts.push(self.display_name(contact).into_owned());

        if let Some(email) = contact.first_email() {
            parts.push(format!("<{}>", email));
        }

        if let Some(phone) = contact.first_phone() {
            parts.push(phone.to_string());
        }

        parts.join("  ")
    }

    fn display_name<'a>(&'a self, contact: &Contact) -> Cow<'a, str> {
        match contact.full_name() {
            Some(name) => match self.options.max_name_length {
                Some(max) => Cow::Owned(ellipsis(&name, max).into_owned()),
                None => Cow::Owned(name),
            },
            None => Cow::Borrowed(&self.options.no_name_text),
        }
    }
}

fn describe_field(field: &ContactField) -> String {
    match field.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(kind) => format!("{} ({})", field.value, kind),
        None => field.value.clone(),
    }
}

fn to_json_contact(contact: &Contact) -> JsonContact {
    JsonContact {
        resource_name: contact.resource_name().map(String::from),
        etag: contact.current_etag().map(String::from),
        name: contact.full_name(),
        emails: contact.email_addresses.clone(),
        phones: contact.phone_numbers.clone(),
    }
}

/// Truncates a string with ellipsis if it exceeds the given length.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}
