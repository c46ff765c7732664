//! Rust library for building a guestbook smart contract on the [Internet Computer].
//! Callers post short text messages and the contract replays them in the order they arrived.
//!
//! * [x] [Key-value store boundary](store::Store) over canister state.
//! * [x] [Element serialization](element::Element) between values and stored bytes.
//! * [x] [Persistent double-ended queue](deque::Deque) addressed by namespace.
//! * [x] [Contract operations](contract::MessageBoard) with their candid types.
//! * [x] [Canister endpoints](canister) exported to the IC runtime.
//!
//! All contract state lives behind the [store](store::Store) trait, so the same
//! operations run against canister state on-chain and against in-memory fakes in tests.
//!
//! All source code are original and released under GPLv3.
//! Please make sure you understand the requirement and risk before using them in your own projects.
//!
//! [Internet Computer]: https://wiki.internetcomputer.org

pub mod canister;
pub mod contract;
pub mod deque;
pub mod element;
pub mod store;
