/// END-TO-END: two clients claim identities, press opposite buttons on the
/// same content, and are paired without either being evicted afterwards.

use pairup_server::{MatchEvent, MatchPair, PairingError, WaitingEndedEvent};
use pairup_shared::{Button, ContentId, Identity};
use pairup_test::{
    assert_no_response_containing, assert_response, assert_response_starts_with, TestClient,
    TestServer,
};

#[test]
fn opposite_presses_pair_and_notify_both() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();

    let mut server = TestServer::new();
    let mut alice = server.connect();
    let mut bob = server.connect();
    server.update();

    alice.claim("alice");
    bob.claim("bob");
    server.update();
    let alice_key = server.key_of(&alice).unwrap();
    let bob_key = server.key_of(&bob).unwrap();

    log::debug!("alice ({}) presses A, bob ({}) is idle", alice_key, bob_key);
    alice.press("A", "c1");
    server.update();

    let responses = alice.responses();
    assert_response_starts_with!(responses, &format!("Button A pressed by {}", alice_key));
    assert_response!(responses, &format!("Stacked {} ( alice ) contentId:c1.", alice_key));
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::A),
        vec![Identity::new("alice")]
    );

    log::debug!("bob presses B one second later");
    bob.press("B", "c1");
    let mut events = server.tick(1000);

    let pairs: Vec<MatchPair> = events.read::<MatchEvent>().collect();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].initiator, Identity::new("bob"));
    assert_eq!(pairs[0].initiator_connection, bob_key);
    assert_eq!(pairs[0].partner, Identity::new("alice"));
    assert_eq!(pairs[0].partner_connection, alice_key);

    let pairing = "Making a pair: bob and alice contentId:c1";
    assert_response!(alice.responses(), pairing);
    let bob_responses = bob.responses();
    assert_response_starts_with!(bob_responses, &format!("Button B pressed by {}", bob_key));
    assert_response!(bob_responses, pairing);

    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::B).is_empty());

    let mut events = server.tick_secs(20);
    assert!(!events.has::<WaitingEndedEvent>());
    assert_eq!(events.read::<WaitingEndedEvent>().count(), 0);
    assert_no_response_containing!(alice.responses(), "Removed");
    assert_no_response_containing!(bob.responses(), "Removed");
}

#[test]
fn same_button_presses_do_not_pair() {
    let mut server = TestServer::new();
    let alice = server.connect();
    let bob = server.connect();
    alice.claim("alice");
    bob.claim("bob");
    server.update();

    alice.press("A", "c1");
    bob.press("A", "c1");
    let mut events = server.update();

    assert!(!events.has::<MatchEvent>());
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::A),
        vec![Identity::new("alice"), Identity::new("bob")]
    );
    assert_eq!(events.read::<MatchEvent>().count(), 0);
}

#[test]
fn different_content_does_not_pair() {
    let mut server = TestServer::new();
    let alice = server.connect();
    let bob = server.connect();
    alice.claim("alice");
    bob.claim("bob");
    server.update();

    alice.press("A", "c1");
    bob.press("B", "c2");
    let events = server.update();

    assert!(!events.has::<MatchEvent>());
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c2"), Button::B),
        vec![Identity::new("bob")]
    );
}

#[test]
fn changing_identity_withdraws_queued_presses() {
    let mut server = TestServer::new();
    let mut first = server.connect();
    let second = server.connect();
    let carol = server.connect();
    server.update();

    first.claim("u1");
    server.update();
    first.press("A", "c1");
    server.update();
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::A),
        vec![Identity::new("u1")]
    );

    first.claim("other");
    server.update();
    assert!(server
        .server()
        .waiting_identities(&ContentId::new("c1"), Button::A)
        .is_empty());

    // "u1" now belongs to another session, which waits instead of meeting
    // the withdrawn entry
    second.claim("u1");
    second.press("B", "c1");
    let events = server.update();
    let second_key = server.key_of(&second).unwrap();

    assert!(!events.has::<MatchEvent>());
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c1"), Button::B),
        vec![Identity::new("u1")]
    );

    carol.claim("carol");
    carol.press("A", "c1");
    let mut events = server.update();

    let pairs: Vec<MatchPair> = events.read::<MatchEvent>().collect();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].initiator, Identity::new("carol"));
    assert_eq!(pairs[0].partner, Identity::new("u1"));
    assert_eq!(pairs[0].partner_connection, second_key);

    // the withdrawn wait never produces an endedWaiting either
    let events = server.tick_secs(11);
    assert!(!events.has::<WaitingEndedEvent>());
    assert!(TestClient::ended_waiting(&first.messages()).is_empty());
}

#[test]
fn pairing_fault_releases_lock_and_reports_generic_failure() {
    let mut server = TestServer::new();
    server
        .server_mut()
        .set_pairing_handler(|_pair: &MatchPair| -> Result<(), PairingError> {
            Err(PairingError::HandlerFailed {
                reason: "storage offline".to_string(),
            })
        });

    let mut alice = server.connect();
    let mut bob = server.connect();
    server.update();
    alice.claim("alice");
    bob.claim("bob");
    server.update();

    alice.press("A", "c1");
    server.update();
    bob.press("B", "c1");
    let events = server.update();

    assert!(!events.has::<MatchEvent>());
    assert_response!(bob.responses(), "Error occurred during matching process.");
    assert_no_response_containing!(alice.responses(), "Making a pair");
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());

    // alice's wait was consumed by the failed pair, only bob's eviction is
    // left and it fires silently
    let events = server.tick_secs(10);
    assert!(!events.has::<WaitingEndedEvent>());
    assert!(alice.messages().is_empty());

    server.server_mut().set_pairing_handler(|_pair: &MatchPair| -> Result<(), PairingError> { Ok(()) });
    let carol = server.connect();
    server.update();
    carol.claim("carol");
    carol.press("A", "c1");
    server.update();

    bob.press("B", "c1");
    let mut events = server.tick_secs(1);
    let pairs: Vec<MatchPair> = events.read::<MatchEvent>().collect();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].initiator, Identity::new("bob"));
    assert_eq!(pairs[0].partner, Identity::new("carol"));
}

#[test]
fn press_without_identity_is_rejected() {
    let mut server = TestServer::new();
    let mut anon = server.connect();
    server.update();

    anon.press("A", "c1");
    server.update();

    assert_eq!(anon.responses(), vec!["Identity is not claimed. Order is invalid.".to_string()]);
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());
}

#[test]
fn invalid_button_is_reported() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    alice.claim("alice");
    server.update();

    alice.press("C", "c1");
    server.update();

    assert_eq!(
        alice.responses(),
        vec!["Invalid button input. buttonId:C contentId:c1.".to_string()]
    );
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::A).is_empty());
    assert!(server.server().waiting_identities(&ContentId::new("c1"), Button::B).is_empty());
}
