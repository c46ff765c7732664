//! The guestbook contract operations and their wire types.
//!
//! Everything here is host-agnostic: operations borrow a [Store] and a
//! [Context], so the same code serves the canister endpoints in
//! [crate::canister] and plain unit tests over in-memory fakes.
//!
//! Messages live in a [Deque] under the [MESSAGES] namespace. New lines are
//! pushed to the front and readers drain from the back, which replays the
//! guestbook oldest entry first.
use crate::deque::{Deque, DequeError};
use crate::store::Store;
use candid::CandidType;
use serde_derive::{Deserialize, Serialize};
use std::{error, fmt};

/// Namespace of the deque holding the guestbook lines.
pub const MESSAGES: &str = "messages";

/// Store key of the caller identity recorded by [MessageBoard::save_my_name].
pub const SENDER: &str = "sender";

/// Read-only view of the call a contract operation runs in.
pub trait Context {
    /// Textual identity of the calling account.
    fn sender(&self) -> String;

    /// Append one line to the host's debug log.
    fn log(&self, message: &str);
}

/// Possible errors of the contract operations.
#[derive(Debug)]
pub enum ContractError {
    /// A posted message had no content.
    BlankMessage,
    /// The message deque failed underneath.
    Deque(DequeError),
}

impl From<DequeError> for ContractError {
    fn from(err: DequeError) -> ContractError {
        ContractError::Deque(err)
    }
}

impl fmt::Display for ContractError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BlankMessage => f.write_str("Message can not be blank."),
            Self::Deque(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for ContractError {}

/// Request body of [MessageBoard::save_my_message].
#[derive(CandidType, Serialize, Deserialize, Clone, Debug)]
pub struct SaveMessageRequest {
    /// Text to append to the guestbook. Must not be empty.
    pub message: String,
}

impl SaveMessageRequest {
    /// Reject a request whose message carries no content.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.message.is_empty() {
            return Err(ContractError::BlankMessage);
        }
        Ok(())
    }
}

/// Response body of [MessageBoard::save_my_message].
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SaveMessageResponse {
    /// True when the message was appended. Failures surface as errors
    /// instead, so a response always carries true.
    pub saved: bool,
}

/// Response body of [MessageBoard::get_all_messages].
#[derive(CandidType, Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MessageList {
    /// Guestbook lines, oldest first.
    pub messages: Vec<String>,
}

/// The guestbook operations, bound to a store and one call's context.
pub struct MessageBoard<'a, S, C> {
    store: &'a mut S,
    ctx: &'a C,
}

impl<'a, S: Store, C: Context> MessageBoard<'a, S, C> {
    /// Bind the operations to `store` and `ctx` for one invocation.
    pub fn new(store: &'a mut S, ctx: &'a C) -> Self {
        Self { store, ctx }
    }

    /// Prove the contract is alive. Appends to the log and touches no state.
    pub fn show_you_know(&self) {
        self.ctx.log("show_you_know() was called");
    }

    /// Record the caller identity under [SENDER], replacing any previous one.
    pub fn save_my_name(&mut self) {
        self.ctx.log("save_my_name() was called");
        let sender = self.ctx.sender();
        self.store.set(SENDER, sender.into_bytes());
    }

    /// Append `"<sender> says <message>"` to the front of the guestbook.
    pub fn save_my_message(
        &mut self,
        request: SaveMessageRequest,
    ) -> Result<SaveMessageResponse, ContractError> {
        self.ctx.log("save_my_message() was called");
        request.validate()?;
        let line = format!("{} says {}", self.ctx.sender(), request.message);
        let mut messages: Deque<S, String> = Deque::new(self.store, MESSAGES);
        messages.push_front(&line)?;
        Ok(SaveMessageResponse { saved: true })
    }

    /// Drain the guestbook from the back, returning its lines oldest first.
    ///
    /// This consumes the stored lines. The canister endpoint exposes it as a
    /// query, where the host discards the mutation after replying.
    pub fn get_all_messages(&mut self) -> Result<MessageList, ContractError> {
        self.ctx.log("get_all_messages() was called");
        let mut deque: Deque<S, String> = Deque::new(self.store, MESSAGES);
        let mut messages = Vec::new();
        while !deque.is_empty()? {
            messages.push(deque.pop_back()?);
        }
        Ok(MessageList { messages })
    }
}

pub mod test {
    use super::Context;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// A fixed-sender implementation of [Context] that captures its log,
    /// used for testing purpose.
    #[derive(Clone)]
    pub struct StaticContext {
        sender: String,
        lines: Rc<RefCell<Vec<String>>>,
    }

    impl StaticContext {
        /// Return a context whose every call appears to come from `sender`.
        pub fn new(sender: &str) -> Self {
            Self {
                sender: sender.to_string(),
                lines: Rc::default(),
            }
        }

        /// Everything logged through this context so far.
        pub fn logged(&self) -> Vec<String> {
            self.lines.borrow().clone()
        }
    }

    impl Context for StaticContext {
        fn sender(&self) -> String {
            self.sender.clone()
        }

        fn log(&self, message: &str) {
            self.lines.borrow_mut().push(message.to_string());
        }
    }
}
