/// COOLDOWN: a connection may have at most one accepted press per ten
/// seconds, whatever the button or content.

use pairup_shared::{Button, ContentId, Identity};
use pairup_test::{assert_response, assert_response_starts_with, TestServer};

#[test]
fn second_press_within_window_is_rejected() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    server.update();
    let key = server.key_of(&alice).unwrap();

    alice.press("A", "c1");
    server.update();
    alice.messages();

    alice.press("B", "c2");
    server.tick_secs(5);

    assert_eq!(
        alice.responses(),
        vec![format!(
            "{} tried to press button B but it's still cooling down. contentId:c2",
            key
        )]
    );
    assert!(server.server().waiting_identities(&ContentId::new("c2"), Button::B).is_empty());
    assert!(server.server().is_cooling_down(&key, &server.now()));
}

#[test]
fn press_at_window_boundary_is_accepted() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    server.update();
    let key = server.key_of(&alice).unwrap();

    alice.press("A", "c1");
    server.update();

    alice.press("A", "c2");
    server.tick_secs(10);

    let responses = alice.responses();
    assert_response_starts_with!(responses, &format!("Button A pressed by {}", key));
    assert_response!(responses, &format!("Stacked {} ( alice ) contentId:c2.", key));
    assert_eq!(
        server.server().waiting_identities(&ContentId::new("c2"), Button::A),
        vec![Identity::new("alice")]
    );
}

#[test]
fn rejected_press_does_not_extend_window() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    server.update();
    let key = server.key_of(&alice).unwrap();

    alice.press("A", "c1");
    server.update();
    alice.press("A", "c1");
    server.tick_secs(9);
    alice.messages();

    alice.press("A", "c3");
    server.tick_secs(1);

    assert_response_starts_with!(alice.responses(), &format!("Button A pressed by {}", key));
}

#[test]
fn invalid_button_does_not_start_cooldown() {
    let mut server = TestServer::new();
    let mut alice = server.connect();
    server.update();
    alice.claim("alice");
    server.update();
    let key = server.key_of(&alice).unwrap();

    alice.press("X", "c1");
    alice.press("A", "c1");
    server.update();

    let responses = alice.responses();
    assert_response!(responses, "Invalid button input. buttonId:X contentId:c1.");
    assert_response_starts_with!(responses, &format!("Button A pressed by {}", key));
}
