pub mod message;
pub mod session;

pub use message::{Message, NewMessage, ANONYMOUS_SENDER};
pub use session::{letters_label, Session, SessionSummary};
