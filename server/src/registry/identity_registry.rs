use std::collections::HashMap;

use pairup_shared::Identity;

use crate::ConnectionKey;

/// Result of binding a connection to an identity
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    /// Connections bound to the identity after the link, in claim order
    pub bound: Vec<ConnectionKey>,
    /// Older connections that held the identity and must now be terminated
    pub superseded: Vec<ConnectionKey>,
}

/// Maps each durable identity to the connections currently claiming it.
///
/// The last claim wins: linking a connection unbinds every other connection
/// holding the same identity and hands them back to the caller, which is
/// responsible for terminating them. Identities with no connections left
/// are dropped from the map.
#[derive(Default)]
pub struct IdentityRegistry {
    identities: HashMap<Identity, Vec<ConnectionKey>>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self {
            identities: HashMap::new(),
        }
    }

    pub fn link(&mut self, identity: &Identity, connection: &ConnectionKey) -> Link {
        let bound = self.identities.entry(identity.clone()).or_default();

        let mut superseded = Vec::new();
        bound.retain(|existing| {
            if existing == connection {
                return true;
            }
            superseded.push(*existing);
            false
        });

        if !bound.contains(connection) {
            bound.push(*connection);
        }

        Link {
            bound: bound.clone(),
            superseded,
        }
    }

    /// Returns whether the connection was bound to the identity
    pub fn unlink(&mut self, identity: &Identity, connection: &ConnectionKey) -> bool {
        let Some(bound) = self.identities.get_mut(identity) else {
            return false;
        };
        let Some(index) = bound.iter().position(|existing| existing == connection) else {
            return false;
        };
        bound.remove(index);
        if bound.is_empty() {
            self.identities.remove(identity);
        }
        true
    }

    pub fn connections(&self, identity: &Identity) -> &[ConnectionKey] {
        self.identities
            .get(identity)
            .map(|bound| bound.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.identities.contains_key(identity)
    }

    /// Number of identities with at least one bound connection
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}
