//! Contact commands: whoami, list, show, add, edit, delete.

use contactbook_core::{Contact, ContactField, ContactFormatter};
use contactbook_providers::PersonField;

use crate::actions::Flash;
use crate::cli::ContactArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

use super::Session;

/// What a contact command produced.
#[derive(Debug)]
pub enum Outcome {
    /// Text for stdout.
    Output(String),
    /// A flash message.
    Flash(Flash),
}

pub async fn whoami(session: &Session) -> Outcome {
    match session.actions().profile().await {
        Ok(profile) => {
            let name = profile.full_name().unwrap_or_else(|| "(no name)".into());
            let line = match profile.first_email() {
                Some(email) => format!("{} <{}> via {}", name, email, session.acquirer_name()),
                None => format!("{} via {}", name, session.acquirer_name()),
            };
            Outcome::Output(line)
        }
        Err(flash) => Outcome::Flash(flash),
    }
}

pub async fn list(session: &Session, config: &ClientConfig, json: bool) -> ClientResult<Outcome> {
    let contacts = match session.actions().list().await {
        Ok(contacts) => contacts,
        Err(flash) => return Ok(Outcome::Flash(flash)),
    };

    let formatter = ContactFormatter::new(config.display.format_options());
    if json || config.display.json {
        return to_json(&formatter.format_json(&contacts)).map(Outcome::Output);
    }
    if contacts.is_empty() {
        return Ok(Outcome::Flash(Flash::info("No contacts found.")));
    }
    Ok(Outcome::Output(formatter.format_tty(&contacts).join("\n")))
}

pub async fn show(
    session: &Session,
    config: &ClientConfig,
    resource_name: &str,
    json: bool,
) -> ClientResult<Outcome> {
    let contact = match session.actions().load_for_edit(resource_name).await {
        Ok(contact) => contact,
        Err(flash) => return Ok(Outcome::Flash(flash)),
    };

    let formatter = ContactFormatter::new(config.display.format_options());
    if json || config.display.json {
        let output = formatter.format_json(std::slice::from_ref(&contact));
        return to_json(&output.contacts[0]).map(Outcome::Output);
    }
    Ok(Outcome::Output(formatter.format_detail(&contact)))
}

pub async fn add(session: &Session, args: &ContactArgs) -> Outcome {
    let mut contact = Contact::new();
    apply_edits(&mut contact, args, false, false);
    Outcome::Flash(session.actions().save(&contact, &PersonField::ALL).await)
}

/// Loads the contact, applies the given flags and saves the touched fields.
pub async fn edit(
    session: &Session,
    resource_name: &str,
    args: &ContactArgs,
    clear_emails: bool,
    clear_phones: bool,
) -> Outcome {
    let actions = session.actions();
    let mut contact = match actions.load_for_edit(resource_name).await {
        Ok(contact) => contact,
        Err(flash) => return Outcome::Flash(flash),
    };

    let fields = apply_edits(&mut contact, args, clear_emails, clear_phones);
    Outcome::Flash(actions.save(&contact, &fields).await)
}

pub async fn delete(session: &Session, resource_name: &str) -> Outcome {
    Outcome::Flash(session.actions().delete(resource_name).await)
}

/// Applies command line fields to `contact`.
///
/// Returns the fields that were touched, in canonical order. A name flag
/// touches `names`; any `--email` or `--clear-emails` replaces the whole
/// email list, and likewise for phones.
pub fn apply_edits(
    contact: &mut Contact,
    args: &ContactArgs,
    clear_emails: bool,
    clear_phones: bool,
) -> Vec<PersonField> {
    let mut fields = Vec::new();

    if args.first.is_some() || args.last.is_some() {
        if let Some(ref first) = args.first {
            contact.first_name = Some(first.clone());
        }
        if let Some(ref last) = args.last {
            contact.last_name = Some(last.clone());
        }
        fields.push(PersonField::Names);
    }

    if clear_emails || !args.email.is_empty() {
        contact.email_addresses = parse_fields(&args.email);
        fields.push(PersonField::EmailAddresses);
    }

    if clear_phones || !args.phone.is_empty() {
        contact.phone_numbers = parse_fields(&args.phone);
        fields.push(PersonField::PhoneNumbers);
    }

    fields
}

fn parse_fields(raw: &[String]) -> Vec<ContactField> {
    raw.iter().map(|r| ContactField::parse(r)).collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> ClientResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| ClientError::InvalidInput(format!("failed to serialize output: {}", e)))
}
