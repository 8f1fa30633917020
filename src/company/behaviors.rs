//! Field-enrichment behaviors.

use tracing::info;
use uuid::Uuid;

use crate::pipeline::{Behavior, BoxFuture, Command, DispatchResult, Next};

/// Fixed prefix of every generated key.
pub const KEY_PREFIX: &str = "123456789-";

/// Length of the UUID fragment appended to [`KEY_PREFIX`].
const KEY_FRAGMENT_LEN: usize = 20;

/// A command carrying a key that [`AddKey`] can overwrite.
pub trait Keyed {
    fn set_key(&mut self, key: String);
}

/// A command carrying a hash that [`AddHash`] can overwrite.
pub trait Hashed {
    fn set_hash(&mut self, hash: String);
}

impl Keyed for super::CreateCompany {
    fn set_key(&mut self, key: String) {
        self.key = key;
    }
}

impl Hashed for super::CreateCompany {
    fn set_hash(&mut self, hash: String) {
        self.hash = hash;
    }
}

/// Sets the key to [`KEY_PREFIX`] followed by the first 20 characters of a
/// fresh hyphenated UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddKey;

impl<C: Command + Keyed> Behavior<C> for AddKey {
    fn handle<'a>(&'a self, mut cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin(async move {
            info!("Adding key to request");
            cmd.set_key(generate_key());
            next.run(cmd).await
        })
    }
}

/// Sets the hash to a fresh hyphenated UUID.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddHash;

impl<C: Command + Hashed> Behavior<C> for AddHash {
    fn handle<'a>(&'a self, mut cmd: C, next: Next<'a, C>) -> BoxFuture<'a, DispatchResult<C>> {
        Box::pin(async move {
            info!("Adding hash to request");
            cmd.set_hash(Uuid::new_v4().to_string());
            next.run(cmd).await
        })
    }
}

fn generate_key() -> String {
    let id = Uuid::new_v4().to_string();
    // hyphenated UUIDs are ASCII, so byte and char offsets agree
    format!("{KEY_PREFIX}{}", &id[..KEY_FRAGMENT_LEN])
}
