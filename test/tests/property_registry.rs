/// PROPERTY-BASED TESTS: identity exclusivity
///
/// Whatever order connections claim identities in, every identity is bound
/// to at most one live connection, and it is the one that claimed it last.

use pairup_server::ConnectionKey;
use pairup_shared::Identity;
use pairup_test::{TestClient, TestServer};
use proptest::prelude::*;

const CLIENTS: usize = 4;
const IDENTITIES: usize = 3;

fn identity(index: usize) -> Identity {
    Identity::new(format!("user-{}", index))
}

proptest! {
    #[test]
    fn prop_identity_bound_to_last_live_claimant(
        claims in prop::collection::vec((0..CLIENTS, 0..IDENTITIES), 1..20)
    ) {
        let mut server = TestServer::new();
        let mut clients: Vec<TestClient> = (0..CLIENTS).map(|_| server.connect()).collect();
        server.update();
        let keys: Vec<ConnectionKey> = clients
            .iter()
            .map(|client| server.key_of(client).unwrap())
            .collect();

        let mut alive = vec![true; CLIENTS];
        let mut held: Vec<Option<usize>> = vec![None; CLIENTS];

        for (client, claimed) in claims {
            if !alive[client] {
                continue;
            }
            clients[client].claim(&identity(claimed).to_string());
            server.update();

            for other in 0..CLIENTS {
                if other != client && alive[other] && held[other] == Some(claimed) {
                    alive[other] = false;
                }
            }
            held[client] = Some(claimed);

            for index in 0..IDENTITIES {
                let expected: Vec<ConnectionKey> = (0..CLIENTS)
                    .filter(|candidate| alive[*candidate] && held[*candidate] == Some(index))
                    .map(|candidate| keys[candidate])
                    .collect();
                prop_assert!(expected.len() <= 1);
                prop_assert_eq!(server.server().identity_connections(&identity(index)), expected);
            }
            for candidate in 0..CLIENTS {
                prop_assert_eq!(clients[candidate].is_closed(), !alive[candidate]);
            }
        }
    }
}
