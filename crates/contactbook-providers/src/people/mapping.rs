//! Field mapping between People API JSON and [`Contact`].

use contactbook_core::{Contact, ContactField};

use super::wire::{
    ApiName, ApiTypedValue, NamePayload, Person, PersonField, PersonPayload, TypedValuePayload,
};

/// Converts an API person into a local contact.
///
/// Absent lists become empty lists. Email and phone entries are copied as
/// they are, without deduplication or reordering.
pub fn contact_from_person(person: Person) -> Contact {
    let mut contact = Contact {
        resource_name: person.resource_name,
        etag: person.etag,
        ..Contact::default()
    };

    if let Some(name) = primary_name(person.names.unwrap_or_default()) {
        contact.first_name = name.given_name;
        contact.last_name = name.family_name;
    }

    contact.email_addresses = copy_values(person.email_addresses);
    contact.phone_numbers = copy_values(person.phone_numbers);
    contact
}

/// Picks the first name variant carrying a given or family name, falling back
/// to the first variant.
fn primary_name(names: Vec<ApiName>) -> Option<ApiName> {
    let position = names
        .iter()
        .position(ApiName::has_structured_name)
        .unwrap_or(0);
    names.into_iter().nth(position)
}

fn copy_values(values: Option<Vec<ApiTypedValue>>) -> Vec<ContactField> {
    values
        .unwrap_or_default()
        .into_iter()
        .map(|v| ContactField {
            value: v.value.unwrap_or_default(),
            kind: v.kind,
        })
        .collect()
}

/// Builds the body for `people:createContact`.
///
/// Every field is sent. The etag and resource name are not.
pub fn create_payload(contact: &Contact) -> PersonPayload {
    PersonPayload {
        etag: None,
        ..fields_payload(contact, &PersonField::ALL)
    }
}

/// Builds the body for `:updateContact`, restricted to `fields`.
///
/// The contact's etag is echoed back when present so the server can reject
/// a concurrent modification.
pub fn update_payload(contact: &Contact, fields: &[PersonField]) -> PersonPayload {
    PersonPayload {
        etag: contact.current_etag().map(String::from),
        ..fields_payload(contact, fields)
    }
}

fn fields_payload(contact: &Contact, fields: &[PersonField]) -> PersonPayload {
    let mut payload = PersonPayload::default();
    for field in fields {
        match field {
            PersonField::Names => payload.names = Some(names_payload(contact)),
            PersonField::EmailAddresses => {
                payload.email_addresses = Some(values_payload(&contact.email_addresses))
            }
            PersonField::PhoneNumbers => {
                payload.phone_numbers = Some(values_payload(&contact.phone_numbers))
            }
        }
    }
    payload
}

/// Builds the outbound `names` array.
///
/// At most one element. An empty array when neither part is set, so an
/// update with `names` in its mask clears the remote names.
fn names_payload(contact: &Contact) -> Vec<NamePayload> {
    let given_name = contact.given_name().map(String::from);
    let family_name = contact.family_name().map(String::from);

    if given_name.is_none() && family_name.is_none() {
        return Vec::new();
    }

    vec![NamePayload {
        given_name,
        family_name,
    }]
}

fn values_payload(fields: &[ContactField]) -> Vec<TypedValuePayload> {
    fields
        .iter()
        .filter(|f| !f.is_blank())
        .map(|f| TypedValuePayload {
            value: f.value.clone(),
            kind: f.kind.clone().filter(|k| !k.is_empty()),
        })
        .collect()
}
