/// DISCONNECT CASCADE: however a connection ends, its liveness timers,
/// queue entries, pending eviction, identity binding and intents are all
/// released, and nothing fires for it afterwards.

use pairup_server::{DisconnectEvent, DisconnectReason, ErrorEvent, IdentifyEvent, WaitingEndedEvent};
use pairup_shared::{Button, ContentId, Identity};
use pairup_test::{assert_response, assert_response_starts_with, TestServer};

#[test]
fn client_close_releases_everything() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    alice.press("A", "c1");
    server.update();
    let alice_key = server.key_of(&alice).unwrap();

    alice.close();
    let mut events = server.tick(500);

    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections, vec![(alice_key, DisconnectReason::ClientClosed)]);
    assert_eq!(server.server().connections_count(), 0);
    assert!(server.server().identity_connections(&Identity::new("alice")).is_empty());
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());
    assert_eq!(server.server().liveness_state(&alice_key), None);

    let events = server.tick_secs(30);
    assert!(!events.has::<WaitingEndedEvent>());
    assert!(!events.has::<DisconnectEvent>());
}

#[test]
fn newer_claim_supersedes_older_connection() {
    let mut server = TestServer::new();
    let mut old_tab = server.connect();
    let new_tab = server.connect();
    server.update();

    old_tab.claim("u");
    server.update();
    let old_key = server.key_of(&old_tab).unwrap();
    old_tab.press("A", "c1");
    server.update();

    new_tab.claim("u");
    let mut events = server.update();
    let new_key = server.key_of(&new_tab).unwrap();

    let identifications: Vec<_> = events.read::<IdentifyEvent>().collect();
    assert_eq!(identifications, vec![(new_key, Identity::new("u"))]);
    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections, vec![(old_key, DisconnectReason::Superseded)]);

    assert!(old_tab.is_closed());
    assert_eq!(server.server().identity_connections(&Identity::new("u")), vec![new_key]);
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());
    assert_eq!(server.server().connection_identity(&new_key), Some(Identity::new("u")));
}

#[test]
fn repeated_claim_on_same_connection_is_a_no_op() {
    let mut server = TestServer::new();
    let tab = server.connect();
    server.update();

    tab.claim("u");
    tab.claim("u");
    let events = server.update();
    let key = server.key_of(&tab).unwrap();

    assert!(!events.has::<DisconnectEvent>());
    assert_eq!(server.server().identity_connections(&Identity::new("u")), vec![key]);
}

#[test]
fn reclaiming_a_different_identity_drops_the_old_binding() {
    let mut server = TestServer::new();
    let tab = server.connect();
    server.update();

    tab.claim("first");
    server.update();
    tab.claim("second");
    server.update();
    let key = server.key_of(&tab).unwrap();

    assert!(server.server().identity_connections(&Identity::new("first")).is_empty());
    assert_eq!(server.server().identity_connections(&Identity::new("second")), vec![key]);
}

#[test]
fn server_initiated_disconnect_closes_client() {
    let mut server = TestServer::new();
    let mut tab = server.connect();
    server.update();
    tab.claim("u");
    server.update();
    let key = server.key_of(&tab).unwrap();

    server.server_mut().disconnect_connection(&key);
    let mut events = server.update();

    let disconnections: Vec<_> = events.read::<DisconnectEvent>().collect();
    assert_eq!(disconnections, vec![(key, DisconnectReason::ServerInitiated)]);
    assert!(tab.is_closed());
    assert!(!server.server().connection_exists(&key));
    assert!(server.server().identity_connections(&Identity::new("u")).is_empty());
}

#[test]
fn malformed_frame_is_reported_and_connection_kept() {
    let mut server = TestServer::new();
    let tab = server.connect();
    server.update();

    tab.send_raw("definitely not json");
    tab.send_raw(r#"{"event":"unknown thing","data":1}"#);
    let mut events = server.update();

    assert_eq!(events.read::<ErrorEvent>().count(), 2);
    assert_eq!(server.server().connections_count(), 1);
}

#[test]
fn new_connection_for_same_identity_starts_fresh() {
    let mut server = TestServer::new();
    let mut old_tab = server.connect();
    server.update();
    old_tab.claim("u1");
    old_tab.press("A", "c1");
    server.update();

    old_tab.close();
    let mut new_tab = server.connect();
    server.update();
    new_tab.claim("u1");
    new_tab.press("A", "c1");
    server.update();
    let key = server.key_of(&new_tab).unwrap();

    let responses = new_tab.responses();
    assert_response_starts_with!(responses, &format!("Button A pressed by {}", key));
    assert_response!(responses, &format!("Stacked {} ( u1 ) contentId:c1.", key));
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::A),
        vec![Identity::new("u1")]
    );
}
