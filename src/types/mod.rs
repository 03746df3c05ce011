pub mod constants;
pub mod error;
pub mod message;

pub use constants::*;
pub use error::{LiveFeedError, Result};
pub use message::{Envelope, Frame};
