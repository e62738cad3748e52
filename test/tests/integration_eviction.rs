/// EVICTION: a waiter nobody pairs with is removed once, ten seconds after
/// its press, and told so.

use pairup_server::{Eviction, WaitingEndedEvent};
use pairup_shared::{Button, ContentId, Identity, ServerMessage, WaitingEnded};
use pairup_test::{assert_response, TestClient, TestServer};

#[test]
fn lone_waiter_is_evicted_once_after_ten_seconds() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    alice.press("A", "c1");
    server.update();
    let alice_key = server.key_of(&alice).unwrap();
    alice.messages();

    log::debug!("{} waits alone on c1", alice_key);
    let events = server.tick(9_999);
    assert!(!events.has::<WaitingEndedEvent>());

    let mut events = server.tick(1);
    let evictions: Vec<Eviction> = events.read::<WaitingEndedEvent>().collect();
    assert_eq!(
        evictions,
        vec![Eviction {
            connection: alice_key,
            identity: Identity::new("alice"),
            content_id: ContentId::new("c1"),
            button: Button::A,
        }]
    );

    let messages = alice.messages();
    assert_eq!(
        messages,
        vec![
            ServerMessage::response("Removed alice contentId:c1."),
            ServerMessage::EndedWaiting(WaitingEnded {
                uuid: Identity::new("alice"),
                content_id: ContentId::new("c1"),
            }),
        ]
    );
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());

    let events = server.tick_secs(30);
    assert!(!events.has::<WaitingEndedEvent>());
    assert!(TestClient::ended_waiting(&alice.messages()).is_empty());
}

#[test]
fn expired_waiter_is_not_paired_with_a_late_press() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    let mut bob = server.connect();
    server.update();
    alice.claim("alice");
    bob.claim("bob");
    server.update();

    alice.press("A", "c1");
    server.update();

    bob.press("B", "c1");
    let mut events = server.tick_secs(10);

    assert_eq!(events.read::<WaitingEndedEvent>().count(), 1);
    assert_eq!(TestClient::ended_waiting(&alice.messages()).len(), 1);
    let bob_key = server.key_of(&bob).unwrap();
    assert_response!(bob.responses(), &format!("Stacked {} ( bob ) contentId:c1.", bob_key));
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::B),
        vec![Identity::new("bob")]
    );
}

#[test]
fn evictions_fire_independently_per_waiter() {
    let mut server = TestServer::new();
    let first = server.connect();
    let second = server.connect();
    server.update();
    first.claim("first");
    second.claim("second");
    server.update();

    first.press("A", "c1");
    server.tick_secs(4);
    second.press("A", "c1");
    server.update();

    let mut events = server.tick_secs(6);
    let evicted: Vec<Identity> = events
        .read::<WaitingEndedEvent>()
        .map(|eviction| eviction.identity)
        .collect();
    assert_eq!(evicted, vec![Identity::new("first")]);
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::A),
        vec![Identity::new("second")]
    );

    let mut events = server.tick_secs(4);
    let evicted: Vec<Identity> = events
        .read::<WaitingEndedEvent>()
        .map(|eviction| eviction.identity)
        .collect();
    assert_eq!(evicted, vec![Identity::new("second")]);
}
