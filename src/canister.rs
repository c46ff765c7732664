//! Canister endpoints binding the guestbook to the IC runtime.
//!
//! Each endpoint builds a [MessageBoard] over the canister's own store and
//! the current call's context and runs one operation. A failed operation
//! traps with the error text, so callers never observe partial state.
//!
//! `show_you_know` and `get_all_messages` are queries: any store mutation
//! they make is discarded by the host after the reply, which lets the
//! listing drain the deque without emptying the published guestbook.
use crate::contract::{
    Context, MessageBoard, MessageList, SaveMessageRequest, SaveMessageResponse,
};
use crate::store::CanisterStore;
use ic_cdk::api;

/// The execution context of the current canister call.
pub struct CanisterContext;

impl Context for CanisterContext {
    fn sender(&self) -> String {
        api::caller().to_text()
    }

    fn log(&self, message: &str) {
        api::print(message);
    }
}

#[ic_cdk::query]
fn show_you_know() {
    let ctx = CanisterContext;
    let mut store = CanisterStore;
    MessageBoard::new(&mut store, &ctx).show_you_know();
}

#[ic_cdk::update]
fn save_my_name() {
    let ctx = CanisterContext;
    let mut store = CanisterStore;
    MessageBoard::new(&mut store, &ctx).save_my_name();
}

#[ic_cdk::update]
fn save_my_message(request: SaveMessageRequest) -> SaveMessageResponse {
    let ctx = CanisterContext;
    let mut store = CanisterStore;
    match MessageBoard::new(&mut store, &ctx).save_my_message(request) {
        Ok(response) => response,
        Err(err) => api::trap(&err.to_string()),
    }
}

#[ic_cdk::query]
fn get_all_messages() -> MessageList {
    let ctx = CanisterContext;
    let mut store = CanisterStore;
    match MessageBoard::new(&mut store, &ctx).get_all_messages() {
        Ok(list) => list,
        Err(err) => api::trap(&err.to_string()),
    }
}
