//! Best-effort email notifications.
//!
//! Services emit a [`NotificationEvent`]; the dispatcher resolves recipients and
//! sends on a spawned task. Failures are logged and never reach the caller.

pub mod dispatcher;
pub mod events;

pub use dispatcher::NotificationDispatcher;
pub use events::NotificationEvent;
