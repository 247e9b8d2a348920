//! Google People API access for contactbook.
//!
//! - [`PeopleClient`] lists, fetches, creates, updates and deletes contacts
//! - [`people::mapping`] converts between API JSON and [`Contact`]
//! - [`TokenAcquirer`] supplies the bearer token each call needs
//! - [`google`] implements the acquirer with Google OAuth and a token file
//! - [`PeopleError`] classifies every failure
//!
//! ```text
//!  TokenAcquirer ──AccessToken──▶ PeopleClient ──HTTPS──▶ people.googleapis.com
//!                                      │
//!                                      ▼ mapping
//!                                   Contact
//! ```
//!
//! [`Contact`]: contactbook_core::Contact

pub mod acquirer;
pub mod error;
pub mod google;
pub mod people;

pub use acquirer::{AccessToken, BoxFuture, StaticTokenAcquirer, TokenAcquirer};
pub use error::{PeopleError, PeopleErrorKind, PeopleResult};
pub use people::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, PEOPLE_API_BASE, PeopleClient, PersonField,
    PersonPayload, UpdateOutcome, contact_from_person, create_payload, update_payload,
};
