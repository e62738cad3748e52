mod identity_registry;

pub use identity_registry::{IdentityRegistry, Link};
