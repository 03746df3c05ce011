// Messaging module - Event classification and local fan-out
pub mod dispatcher;
pub mod event;

pub use dispatcher::{EventDispatcher, Notification};
pub use event::{EventClass, PushEvent};
