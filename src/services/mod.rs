pub mod filter_service;
pub mod notification_service;
pub mod relay_service;
pub mod throttle;

pub use filter_service::{select, Selection};
pub use notification_service::{ConsoleNotifier, Notifier, TelegramNotifier};
pub use relay_service::{RelayService, RunSummary};
pub use throttle::Throttle;
