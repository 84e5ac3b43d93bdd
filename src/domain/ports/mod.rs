//! Port trait definitions (Hexagonal Architecture)
//!
//! - `ChatGateway`: chat-completion provider
//! - `ProblemBank`: loaded debugging problems
//! - `SessionStore`: session persistence

pub mod chat_gateway;
pub mod problem_bank;
pub mod session_store;

pub use chat_gateway::{ChatGateway, ChatMessage, ChatRequest, GatewayError, TextStream};
pub use problem_bank::ProblemBank;
pub use session_store::SessionStore;
