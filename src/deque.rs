//! A double-ended queue persisted in the canister's key-value store.
//!
//! The deque holds nothing in memory. A [Deque] handle is a namespace string
//! plus a borrowed [Store]; every operation reads and writes the store
//! directly, so dropping a handle loses nothing and a handle constructed
//! later over the same namespace sees everything pushed before.
//!
//! Two signed counters delimit the half-open range `[first, last)` of
//! occupied slots. Pushing to the front grows the range downward into
//! negative indices and pushing to the back grows it upward; the deque is
//! empty exactly when the counters meet. Slot `i` lives under the store key
//! `"<namespace>:<i>"` and the counters under `"<namespace>:first"` and
//! `"<namespace>:last"`, so deques under different namespaces never collide.
//!
//! Elements are encoded one per slot by their [Element] implementation.
use crate::element::Element;
use crate::store::Store;
use std::string::FromUtf8Error;
use std::{error, fmt};

/// Possible errors when operating on a persisted deque.
#[derive(Debug)]
pub enum DequeError {
    /// Attempted to pop or peek an empty deque.
    Empty,
    /// A stored counter or element could not be read back.
    Corrupt(String),
}

impl From<candid::Error> for DequeError {
    fn from(err: candid::Error) -> DequeError {
        DequeError::Corrupt(err.to_string())
    }
}

impl From<FromUtf8Error> for DequeError {
    fn from(err: FromUtf8Error) -> DequeError {
        DequeError::Corrupt(err.to_string())
    }
}

impl fmt::Display for DequeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Deque is empty"),
            Self::Corrupt(what) => write!(f, "Corrupt deque state: {}", what),
        }
    }
}

impl error::Error for DequeError {}

/// Store key of slot `index` under `namespace`.
fn slot_key(namespace: &str, index: i64) -> String {
    format!("{}:{}", namespace, index)
}

/// Store key of the counter holding the first occupied index.
fn first_key(namespace: &str) -> String {
    format!("{}:first", namespace)
}

/// Store key of the counter holding the one-past-last occupied index.
fn last_key(namespace: &str) -> String {
    format!("{}:last", namespace)
}

/// A generic deque parameterized by its storage type `S` and element type `T`.
pub struct Deque<'a, S, T> {
    store: &'a mut S,
    namespace: String,
    element: std::marker::PhantomData<T>,
}

impl<'a, S: Store, T: Element> Deque<'a, S, T> {
    /// Return a `Deque` over `namespace`, backed by `store`.
    ///
    /// A namespace never pushed to reads as an empty deque; nothing is
    /// written until the first push.
    pub fn new(store: &'a mut S, namespace: &str) -> Self {
        Self {
            store,
            namespace: namespace.to_string(),
            element: std::marker::PhantomData,
        }
    }

    /// Return true if no slot is occupied. Reads both counters and writes
    /// nothing.
    pub fn is_empty(&self) -> Result<bool, DequeError> {
        Ok(self.first_index()? == self.last_index()?)
    }

    /// Return the number of occupied slots.
    pub fn len(&self) -> Result<u64, DequeError> {
        Ok((self.last_index()? - self.first_index()?) as u64)
    }

    /// Prepend `value`, extending the occupied range downward.
    pub fn push_front(&mut self, value: &T) -> Result<(), DequeError> {
        let bytes = value.encode()?;
        let first = self.first_index()? - 1;
        let slot = slot_key(&self.namespace, first);
        self.store.set(&slot, bytes);
        self.set_first_index(first);
        Ok(())
    }

    /// Append `value`, extending the occupied range upward.
    pub fn push_back(&mut self, value: &T) -> Result<(), DequeError> {
        let bytes = value.encode()?;
        let last = self.last_index()?;
        let slot = slot_key(&self.namespace, last);
        self.store.set(&slot, bytes);
        self.set_last_index(last + 1);
        Ok(())
    }

    /// Remove and return the element at the front.
    pub fn pop_front(&mut self) -> Result<T, DequeError> {
        let first = self.first_index()?;
        if first == self.last_index()? {
            return Err(DequeError::Empty);
        }
        let slot = slot_key(&self.namespace, first);
        let value = self.read_slot(&slot)?;
        self.store.remove(&slot);
        self.set_first_index(first + 1);
        Ok(value)
    }

    /// Remove and return the element at the back.
    pub fn pop_back(&mut self) -> Result<T, DequeError> {
        let last = self.last_index()?;
        if self.first_index()? == last {
            return Err(DequeError::Empty);
        }
        let last = last - 1;
        self.set_last_index(last);
        let slot = slot_key(&self.namespace, last);
        let value = self.read_slot(&slot)?;
        self.store.remove(&slot);
        Ok(value)
    }

    /// Read the element at the front without removing it.
    pub fn front(&self) -> Result<T, DequeError> {
        let first = self.first_index()?;
        if first == self.last_index()? {
            return Err(DequeError::Empty);
        }
        self.read_slot(&slot_key(&self.namespace, first))
    }

    /// Read the element at the back without removing it.
    pub fn back(&self) -> Result<T, DequeError> {
        let last = self.last_index()?;
        if self.first_index()? == last {
            return Err(DequeError::Empty);
        }
        self.read_slot(&slot_key(&self.namespace, last - 1))
    }

    fn first_index(&self) -> Result<i64, DequeError> {
        self.index_counter(&first_key(&self.namespace))
    }

    fn last_index(&self) -> Result<i64, DequeError> {
        self.index_counter(&last_key(&self.namespace))
    }

    /// Read an index counter. An absent counter reads as 0, so a fresh
    /// namespace is empty without any setup write.
    fn index_counter(&self, key: &str) -> Result<i64, DequeError> {
        match self.store.get(key) {
            None => Ok(0),
            Some(bytes) => {
                let cell: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    DequeError::Corrupt(format!(
                        "counter {} holds {} bytes, want 8",
                        key,
                        bytes.len()
                    ))
                })?;
                Ok(i64::from_le_bytes(cell))
            }
        }
    }

    fn set_first_index(&mut self, index: i64) {
        let key = first_key(&self.namespace);
        self.store.set(&key, index.to_le_bytes().to_vec());
    }

    fn set_last_index(&mut self, index: i64) {
        let key = last_key(&self.namespace);
        self.store.set(&key, index.to_le_bytes().to_vec());
    }

    fn read_slot(&self, key: &str) -> Result<T, DequeError> {
        let bytes = self
            .store
            .get(key)
            .ok_or_else(|| DequeError::Corrupt(format!("slot {} is missing", key)))?;
        T::decode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::test::MemoryStore;
    use assert_matches::assert_matches;
    use candid::CandidType;
    use proptest::prelude::*;
    use serde_derive::Deserialize;
    use std::collections::VecDeque;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn fresh_namespace_reads_as_empty() {
        let mut store = MemoryStore::default();
        let probe = store.clone();
        let deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        assert!(deque.is_empty().unwrap());
        assert_eq!(deque.len().unwrap(), 0);
        assert_matches!(deque.front(), Err(DequeError::Empty));
        assert_matches!(deque.back(), Err(DequeError::Empty));
        // reads alone write nothing
        assert_eq!(probe.len(), 0);
    }

    #[test]
    fn pop_on_empty_fails_and_changes_nothing() {
        let mut store = MemoryStore::default();
        let probe = store.clone();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        assert_matches!(deque.pop_front(), Err(DequeError::Empty));
        assert_matches!(deque.pop_back(), Err(DequeError::Empty));
        assert!(deque.is_empty().unwrap());
        assert_eq!(probe.len(), 0);
    }

    #[test]
    fn front_pushes_drain_from_the_back_in_push_order() {
        let mut store = MemoryStore::default();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "messages");
        deque.push_front(&"alice says hi".to_string()).unwrap();
        deque.push_front(&"bob says yo".to_string()).unwrap();
        let mut drained = Vec::new();
        while !deque.is_empty().unwrap() {
            drained.push(deque.pop_back().unwrap());
        }
        assert_eq!(drained, strings(&["alice says hi", "bob says yo"]));
        assert_matches!(deque.pop_back(), Err(DequeError::Empty));
    }

    #[test]
    fn same_end_pops_are_lifo() {
        let mut store = MemoryStore::default();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        for v in ["a", "b", "c"] {
            deque.push_back(&v.to_string()).unwrap();
        }
        assert_eq!(deque.pop_back().unwrap(), "c");
        assert_eq!(deque.pop_back().unwrap(), "b");
        deque.push_front(&"x".to_string()).unwrap();
        assert_eq!(deque.pop_front().unwrap(), "x");
        assert_eq!(deque.pop_front().unwrap(), "a");
        assert!(deque.is_empty().unwrap());
    }

    #[test]
    fn peeks_do_not_consume() {
        let mut store = MemoryStore::default();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        deque.push_back(&"a".to_string()).unwrap();
        deque.push_back(&"b".to_string()).unwrap();
        assert_eq!(deque.front().unwrap(), "a");
        assert_eq!(deque.front().unwrap(), "a");
        assert_eq!(deque.back().unwrap(), "b");
        assert_eq!(deque.len().unwrap(), 2);
    }

    #[test]
    fn pops_clear_their_slots() {
        let mut store = MemoryStore::default();
        let probe = store.clone();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        deque.push_front(&"a".to_string()).unwrap();
        deque.push_back(&"b".to_string()).unwrap();
        assert!(probe.contains("q:-1"));
        assert!(probe.contains("q:0"));
        deque.pop_front().unwrap();
        deque.pop_back().unwrap();
        assert!(!probe.contains("q:-1"));
        assert!(!probe.contains("q:0"));
        // the counters stay behind, meeting at the same value
        assert!(probe.contains("q:first"));
        assert!(probe.contains("q:last"));
        assert!(deque.is_empty().unwrap());
    }

    #[test]
    fn state_survives_the_handle() {
        let mut store = MemoryStore::default();
        let mut writer_store = store.clone();
        {
            let mut writer: Deque<MemoryStore, String> = Deque::new(&mut writer_store, "q");
            writer.push_back(&"persisted".to_string()).unwrap();
        }
        let mut reader: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        assert_eq!(reader.pop_front().unwrap(), "persisted");
    }

    #[test]
    fn namespaces_are_disjoint() {
        let mut store_a = MemoryStore::default();
        let mut store_b = store_a.clone();
        let mut a: Deque<MemoryStore, String> = Deque::new(&mut store_a, "a");
        let mut b: Deque<MemoryStore, String> = Deque::new(&mut store_b, "b");
        a.push_back(&"only in a".to_string()).unwrap();
        assert!(b.is_empty().unwrap());
        b.push_back(&"only in b".to_string()).unwrap();
        assert_eq!(a.pop_back().unwrap(), "only in a");
        assert_eq!(b.pop_back().unwrap(), "only in b");
    }

    #[test]
    fn derived_keys_of_distinct_namespaces_never_meet() {
        // even when one namespace reads like a slot key of the other
        let mut keys = vec![first_key("m"), last_key("m")];
        keys.extend((-3..3).map(|i| slot_key("m", i)));
        for ns in ["m:1", "m:first", "n"] {
            let mut others = vec![first_key(ns), last_key(ns)];
            others.extend((-3..3).map(|i| slot_key(ns, i)));
            for key in &others {
                assert!(!keys.contains(key), "{} collides", key);
            }
        }
    }

    #[test]
    fn corrupt_counter_is_reported() {
        let mut store = MemoryStore::default();
        store.set("q:first", vec![1, 2, 3]);
        let deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        assert_matches!(deque.is_empty(), Err(DequeError::Corrupt(_)));
    }

    #[test]
    fn missing_slot_is_reported() {
        let mut store = MemoryStore::default();
        let mut probe = store.clone();
        let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");
        deque.push_back(&"x".to_string()).unwrap();
        probe.remove("q:0");
        assert_matches!(deque.pop_front(), Err(DequeError::Corrupt(_)));
        // the failed pop did not move the front counter
        assert_eq!(deque.len().unwrap(), 1);
    }

    #[test]
    fn candid_coded_elements_round_trip() {
        #[derive(CandidType, Deserialize, Clone, Debug, PartialEq)]
        struct Line {
            author: String,
            body: String,
        }

        impl Element for Line {
            fn encode(&self) -> Result<Vec<u8>, DequeError> {
                Ok(candid::encode_one(self)?)
            }

            fn decode(bytes: Vec<u8>) -> Result<Self, DequeError> {
                Ok(candid::decode_one(&bytes)?)
            }
        }

        let mut store = MemoryStore::default();
        let mut deque: Deque<MemoryStore, Line> = Deque::new(&mut store, "lines");
        let line = Line {
            author: "alice".to_string(),
            body: "hi".to_string(),
        };
        deque.push_back(&line).unwrap();
        assert_eq!(deque.pop_front().unwrap(), line);
        assert!(deque.is_empty().unwrap());
    }

    #[derive(Clone, Debug)]
    enum Op {
        PushFront(String),
        PushBack(String),
        PopFront,
        PopBack,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[a-z]{0,6}".prop_map(Op::PushFront),
            "[a-z]{0,6}".prop_map(Op::PushBack),
            Just(Op::PopFront),
            Just(Op::PopBack),
        ]
    }

    proptest! {
        #[test]
        fn replay_order_is_fifo(values in proptest::collection::vec(".*", 0..24)) {
            let mut store = MemoryStore::default();
            let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "q");

            // push to the back, pop from the front
            for v in &values {
                deque.push_back(v).unwrap();
            }
            for v in &values {
                prop_assert_eq!(&deque.pop_front().unwrap(), v);
            }
            prop_assert!(deque.is_empty().unwrap());

            // push to the front, pop from the back
            for v in &values {
                deque.push_front(v).unwrap();
            }
            for v in &values {
                prop_assert_eq!(&deque.pop_back().unwrap(), v);
            }
            prop_assert!(deque.is_empty().unwrap());
        }

        #[test]
        fn agrees_with_std_vecdeque(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut store = MemoryStore::default();
            let mut deque: Deque<MemoryStore, String> = Deque::new(&mut store, "model");
            let mut model: VecDeque<String> = VecDeque::new();
            for op in ops {
                match op {
                    Op::PushFront(v) => {
                        deque.push_front(&v).unwrap();
                        model.push_front(v);
                    }
                    Op::PushBack(v) => {
                        deque.push_back(&v).unwrap();
                        model.push_back(v);
                    }
                    Op::PopFront => match model.pop_front() {
                        Some(expected) => prop_assert_eq!(deque.pop_front().unwrap(), expected),
                        None => assert_matches!(deque.pop_front(), Err(DequeError::Empty)),
                    },
                    Op::PopBack => match model.pop_back() {
                        Some(expected) => prop_assert_eq!(deque.pop_back().unwrap(), expected),
                        None => assert_matches!(deque.pop_back(), Err(DequeError::Empty)),
                    },
                }
                prop_assert_eq!(deque.len().unwrap() as usize, model.len());
                prop_assert_eq!(deque.is_empty().unwrap(), model.is_empty());
            }
        }
    }
}
