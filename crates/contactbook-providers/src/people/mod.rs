//! Google People API access.
//!
//! - [`PeopleClient`] issues the list/get/create/update/delete calls
//! - [`wire`] holds the typed JSON structures, decoded once at the boundary
//! - [`mapping`] converts between those structures and [`Contact`]
//!
//! [`Contact`]: contactbook_core::Contact

mod client;
pub mod mapping;
pub mod wire;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, PEOPLE_API_BASE, PeopleClient, UpdateOutcome,
};
pub use mapping::{contact_from_person, create_payload, update_payload};
pub use wire::{PersonField, PersonPayload};

#[cfg(test)]
mod http_tests;
