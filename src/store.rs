//! The canister's durable key-value storage.
//!
//! The contract keeps all of its state in one string-keyed byte store:
//!
//! * [Store] is the storage interface the rest of the crate is written
//!   against. Being a trait it allows alternative implementations, for
//!   example in testing code.
//!
//! * [CanisterStore] implements it over canister-resident state. The canister
//!   runtime persists that state between calls and rolls it back when a call
//!   traps.
//!
//! * [test::MemoryStore] is a map-backed implementation for off-chain tests.
use std::cell::RefCell;
use std::collections::BTreeMap;

/// A durable byte store keyed by string.
///
/// Reads and writes are synchronous and infallible; keeping the bytes alive
/// across invocations is the host's job.
pub trait Store {
    /// Return the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: Vec<u8>);

    /// Delete the value stored under `key`, if any. Deleting an absent key is
    /// a no-op.
    fn remove(&mut self, key: &str);

    /// Return true if `key` currently holds a value.
    ///
    /// Implementations may override this when they can answer without copying
    /// the value out.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

thread_local! {
    static STATE: RefCell<BTreeMap<String, Vec<u8>>> = RefCell::new(BTreeMap::new());
}

/// Contract state kept on the canister heap.
///
/// Every instance addresses the same thread-local map; any number of handles
/// may exist per call.
#[derive(Clone, Copy, Default)]
pub struct CanisterStore;

impl Store for CanisterStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        STATE.with(|state| state.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Vec<u8>) {
        STATE.with(|state| state.borrow_mut().insert(key.to_string(), value));
    }

    fn remove(&mut self, key: &str) {
        STATE.with(|state| state.borrow_mut().remove(key));
    }

    fn contains(&self, key: &str) -> bool {
        STATE.with(|state| state.borrow().contains_key(key))
    }
}

pub mod test {
    use super::*;
    use std::rc::Rc;

    /// A map-based implementation of [Store], used for testing purpose.
    ///
    /// Clones share the underlying map, so a test can hold a probe handle
    /// onto the same state a contract operation is mutating.
    #[derive(Clone, Default)]
    pub struct MemoryStore {
        cells: Rc<RefCell<BTreeMap<String, Vec<u8>>>>,
    }

    impl MemoryStore {
        /// Number of keys currently stored.
        pub fn len(&self) -> usize {
            self.cells.borrow().len()
        }

        /// True if nothing is stored.
        pub fn is_empty(&self) -> bool {
            self.cells.borrow().is_empty()
        }
    }

    impl Store for MemoryStore {
        fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.cells.borrow().get(key).cloned()
        }

        fn set(&mut self, key: &str, value: Vec<u8>) {
            self.cells.borrow_mut().insert(key.to_string(), value);
        }

        fn remove(&mut self, key: &str) {
            self.cells.borrow_mut().remove(key);
        }

        fn contains(&self, key: &str) -> bool {
            self.cells.borrow().contains_key(key)
        }
    }
}
