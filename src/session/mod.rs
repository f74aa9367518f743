//! Session layer: the uniform contract over backend adapters.

pub mod manager;
pub mod session;
pub mod transcript;

pub use manager::SessionManager;
pub use session::{Session, SessionDescription};
pub use transcript::{Exchange, Transcript};
