//! People API v1 wire types.
//!
//! Inbound types are lenient: every key may be absent or `null`. Outbound
//! types only serialize what the field mapping decided to send.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A person resource as returned by the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub resource_name: Option<String>,
    pub etag: Option<String>,
    pub names: Option<Vec<ApiName>>,
    pub email_addresses: Option<Vec<ApiTypedValue>>,
    pub phone_numbers: Option<Vec<ApiTypedValue>>,
}

/// A name variant from the API.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiName {
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub display_name: Option<String>,
}

impl ApiName {
    /// Returns true if this variant carries a given or family name.
    pub fn has_structured_name(&self) -> bool {
        self.given_name.is_some() || self.family_name.is_some()
    }
}

/// An email address or phone number from the API.
#[derive(Debug, Default, Deserialize)]
pub struct ApiTypedValue {
    pub value: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Response from `people/me/connections`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConnectionsResponse {
    pub connections: Option<Vec<Person>>,
    pub next_page_token: Option<String>,
}

/// Request body for `people:createContact` and `:updateContact`.
///
/// Top-level fields left as `None` are omitted from the JSON and therefore
/// from the update mask.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<NamePayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_addresses: Option<Vec<TypedValuePayload>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_numbers: Option<Vec<TypedValuePayload>>,
}

impl PersonPayload {
    /// Returns the fields present in this payload, in canonical order.
    pub fn present_fields(&self) -> Vec<PersonField> {
        let mut fields = Vec::with_capacity(3);
        if self.names.is_some() {
            fields.push(PersonField::Names);
        }
        if self.email_addresses.is_some() {
            fields.push(PersonField::EmailAddresses);
        }
        if self.phone_numbers.is_some() {
            fields.push(PersonField::PhoneNumbers);
        }
        fields
    }

    /// Returns the `updatePersonFields` mask, or `None` if no field is present.
    ///
    /// An empty array still counts as present: sending `"names": []` with
    /// `names` in the mask clears the remote names.
    pub fn update_mask(&self) -> Option<String> {
        let fields = self.present_fields();
        if fields.is_empty() {
            None
        } else {
            Some(PersonField::join(&fields))
        }
    }
}

/// A name sent to the API.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
}

/// An email address or phone number sent to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypedValuePayload {
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A top-level person field that can appear in a field mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PersonField {
    Names,
    EmailAddresses,
    PhoneNumbers,
}

impl PersonField {
    /// Every maskable field, in canonical order.
    pub const ALL: [PersonField; 3] = [Self::Names, Self::EmailAddresses, Self::PhoneNumbers];

    /// Returns the API name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Names => "names",
            Self::EmailAddresses => "emailAddresses",
            Self::PhoneNumbers => "phoneNumbers",
        }
    }

    /// Comma-joins field names for a `personFields` or `updatePersonFields` mask.
    pub fn join(fields: &[PersonField]) -> String {
        fields
            .iter()
            .map(PersonField::as_str)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for PersonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PersonField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "names" => Ok(Self::Names),
            "emailAddresses" => Ok(Self::EmailAddresses),
            "phoneNumbers" => Ok(Self::PhoneNumbers),
            other => Err(format!("unknown person field: {}", other)),
        }
    }
}
