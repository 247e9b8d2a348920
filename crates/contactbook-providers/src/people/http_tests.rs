//! People API calls against a local mock server.

use contactbook_core::{Contact, ContactField};
use httpmock::Method::PATCH;
use httpmock::prelude::*;
use serde_json::json;

use super::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_TIMEOUT, PeopleClient, PersonField, UpdateOutcome};
use crate::acquirer::AccessToken;
use crate::error::PeopleError;

const ALL_FIELDS: &str = "names,emailAddresses,phoneNumbers";

fn client(server: &MockServer) -> PeopleClient {
    PeopleClient::new(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
        .unwrap()
        .with_base_url(server.base_url())
}

fn token() -> AccessToken {
    AccessToken::new("ya29.test")
}

fn without_page_token(req: &HttpMockRequest) -> bool {
    req.query_params
        .as_ref()
        .is_none_or(|params| params.iter().all(|(k, _)| k != "pageToken"))
}

#[tokio::test]
async fn list_maps_connections_in_order() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/me/connections")
                .query_param("personFields", ALL_FIELDS)
                .header("authorization", "Bearer ya29.test");
            then.status(200).json_body(json!({
                "connections": [
                    {
                        "resourceName": "people/c1",
                        "etag": "e1",
                        "names": [{"givenName": "Ana", "familyName": "Lopez"}],
                        "emailAddresses": [{"value": "ana@example.com", "type": "work"}]
                    },
                    {
                        "resourceName": "people/c2",
                        "phoneNumbers": [{"value": "+1 555 0100"}]
                    }
                ],
                "totalPeople": 2
            }));
        })
        .await;

    let contacts = client(&server).list_contacts(&token()).await.unwrap();
    mock.assert_async().await;

    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0].full_name().as_deref(), Some("Ana Lopez"));
    assert_eq!(contacts[0].first_email(), Some("ana@example.com"));
    assert_eq!(contacts[1].resource_name(), Some("people/c2"));
    assert_eq!(contacts[1].first_phone(), Some("+1 555 0100"));
    assert!(contacts[1].email_addresses.is_empty());
}

#[tokio::test]
async fn list_without_connections_is_empty() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/people/me/connections");
            then.status(200).json_body(json!({"totalPeople": 0}));
        })
        .await;

    let contacts = client(&server).list_contacts(&token()).await.unwrap();
    assert!(contacts.is_empty());
}

#[tokio::test]
async fn list_follows_page_tokens() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/me/connections")
                .matches(without_page_token);
            then.status(200).json_body(json!({
                "connections": [{"resourceName": "people/c1"}],
                "nextPageToken": "p2"
            }));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/me/connections")
                .query_param("pageToken", "p2");
            then.status(200).json_body(json!({
                "connections": [{"resourceName": "people/c2"}],
                "nextPageToken": ""
            }));
        })
        .await;

    let contacts = client(&server).list_contacts(&token()).await.unwrap();
    first.assert_async().await;
    second.assert_async().await;

    let names: Vec<_> = contacts.iter().filter_map(Contact::resource_name).collect();
    assert_eq!(names, vec!["people/c1", "people/c2"]);
}

#[tokio::test]
async fn list_stops_on_repeated_page_token() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/me/connections")
                .matches(without_page_token);
            then.status(200).json_body(json!({
                "connections": [{"resourceName": "people/c1"}],
                "nextPageToken": "p2"
            }));
        })
        .await;
    let stuck = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/me/connections")
                .query_param("pageToken", "p2");
            then.status(200).json_body(json!({
                "connections": [{"resourceName": "people/c2"}],
                "nextPageToken": "p2"
            }));
        })
        .await;

    let contacts = client(&server).list_contacts(&token()).await.unwrap();
    first.assert_async().await;
    stuck.assert_hits_async(1).await;
    assert_eq!(contacts.len(), 2);
}

#[tokio::test]
async fn list_error_status_is_remote_api() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/people/me/connections");
            then.status(500).body(r#"{"error":{"code":500,"message":"backend"}}"#);
        })
        .await;

    let err = client(&server).list_contacts(&token()).await.unwrap_err();
    match err {
        PeopleError::RemoteApi { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("backend"));
        }
        other => panic!("expected RemoteApi, got {other:?}"),
    }
}

#[tokio::test]
async fn get_missing_contact_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/people/c404");
            then.status(404).body(r#"{"error":{"code":404}}"#);
        })
        .await;

    let err = client(&server)
        .get_contact(&token(), "people/c404")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn get_contact_requests_all_fields() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/people/c1")
                .query_param("personFields", ALL_FIELDS);
            then.status(200).json_body(json!({
                "resourceName": "people/c1",
                "etag": "abc",
                "names": [{"givenName": "Ana"}]
            }));
        })
        .await;

    let contact = client(&server)
        .get_contact(&token(), "people/c1")
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(contact.current_etag(), Some("abc"));
    assert_eq!(contact.full_name().as_deref(), Some("Ana"));
}

#[tokio::test]
async fn get_profile_reads_people_me() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/people/me");
            then.status(200).json_body(json!({
                "resourceName": "people/me1",
                "names": [{"givenName": "Sam", "familyName": "Ito"}],
                "emailAddresses": [{"value": "sam@example.com"}]
            }));
        })
        .await;

    let profile = client(&server).get_profile(&token()).await.unwrap();
    mock.assert_async().await;
    assert_eq!(profile.full_name().as_deref(), Some("Sam Ito"));
    assert_eq!(profile.first_email(), Some("sam@example.com"));
}

#[tokio::test]
async fn create_posts_fields_without_identity() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/people:createContact")
                .header("authorization", "Bearer ya29.test")
                .header("content-type", "application/json")
                .json_body(json!({
                    "names": [{"givenName": "Ana", "familyName": "Lopez"}],
                    "emailAddresses": [{"value": "ana@example.com", "type": "home"}],
                    "phoneNumbers": []
                }));
            then.status(200)
                .json_body(json!({"resourceName": "people/c9", "etag": "new"}));
        })
        .await;

    let contact = Contact::new()
        .with_etag("stale")
        .with_first_name("Ana")
        .with_last_name("Lopez")
        .with_email(ContactField::new("ana@example.com").with_kind("home"))
        .with_phone(ContactField::new(""));
    client(&server)
        .create_contact(&token(), &contact)
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn update_sends_etag_and_mask() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/people/c1:updateContact")
                .query_param("updatePersonFields", ALL_FIELDS)
                .header("authorization", "Bearer ya29.test")
                .json_body(json!({
                    "etag": "abc",
                    "names": [{"givenName": "Ana"}],
                    "emailAddresses": [{"value": "a@x.com"}],
                    "phoneNumbers": []
                }));
            then.status(200).json_body(json!({"resourceName": "people/c1"}));
        })
        .await;

    let contact = Contact::new()
        .with_resource_name("people/c1")
        .with_etag("abc")
        .with_first_name("Ana")
        .with_last_name("")
        .with_email(ContactField::new("a@x.com"));
    let outcome = client(&server)
        .update_contact(&token(), &contact)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(outcome, UpdateOutcome::Updated);
}

#[tokio::test]
async fn update_of_selected_fields_masks_only_those() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/people/c1:updateContact")
                .query_param("updatePersonFields", "phoneNumbers")
                .json_body(json!({
                    "etag": "abc",
                    "phoneNumbers": [{"value": "+1 555 0100", "type": "mobile"}]
                }));
            then.status(200).body("{}");
        })
        .await;

    let contact = Contact::new()
        .with_resource_name("people/c1")
        .with_etag("abc")
        .with_first_name("Ana")
        .with_phone(ContactField::new("+1 555 0100").with_kind("mobile"));
    let outcome = client(&server)
        .update_contact_fields(&token(), &contact, &[PersonField::PhoneNumbers])
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(outcome, UpdateOutcome::Updated);
}

#[tokio::test]
async fn update_without_fields_sends_nothing() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(PATCH);
            then.status(200).body("{}");
        })
        .await;

    let contact = Contact::new()
        .with_resource_name("people/c1")
        .with_etag("abc")
        .with_first_name("Ana");
    let outcome = client(&server)
        .update_contact_fields(&token(), &contact, &[])
        .await
        .unwrap();
    assert_eq!(outcome, UpdateOutcome::NoChanges);
    assert_eq!(mock.hits_async().await, 0);
}

#[tokio::test]
async fn update_conflict_keeps_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/people/c1:updateContact");
            then.status(400)
                .body(r#"{"error":{"status":"FAILED_PRECONDITION","message":"etag mismatch"}}"#);
        })
        .await;

    let contact = Contact::new()
        .with_resource_name("people/c1")
        .with_etag("old")
        .with_first_name("Ana");
    let err = client(&server)
        .update_contact(&token(), &contact)
        .await
        .unwrap_err();
    assert!(err.remote_body().unwrap().contains("etag mismatch"));
}

#[tokio::test]
async fn delete_calls_delete_contact() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(DELETE)
                .path("/people/c1:deleteContact")
                .header("authorization", "Bearer ya29.test");
            then.status(200).body("{}");
        })
        .await;

    client(&server)
        .delete_contact(&token(), "people/c1")
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn delete_missing_contact_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/people/c404:deleteContact");
            then.status(404);
        })
        .await;

    let err = client(&server)
        .delete_contact(&token(), "people/c404")
        .await
        .unwrap_err();
    assert!(matches!(err, PeopleError::NotFound(ref r) if r == "people/c404"));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let client = PeopleClient::new(DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
        .unwrap()
        .with_base_url("http://127.0.0.1:1");
    let err = client.list_contacts(&token()).await.unwrap_err();
    assert!(matches!(err, PeopleError::Transport { .. }));
}
