//! Conversation domain module.
//!
//! - `message`: message types (`MessageRole`, `Message`)
//! - `model`: the conversation state machine (`Conversation`)

mod message;
mod model;

pub use message::{Message, MessageRole, PENDING_TEXT};
pub use model::{Conversation, OutboundExchange, WELCOME_TEXT};
