//! Report delivery notification.

pub mod notifier;

pub use notifier::{Notifier, TracingNotifier};
