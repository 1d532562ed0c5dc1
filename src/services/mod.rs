// Service exports
pub mod postgres;
pub mod sessions;
pub mod telegram;

pub use postgres::{PostgresClient, PostgresError, RoundSnapshot};
pub use sessions::SessionStore;
pub use telegram::{TelegramError, TelegramNotifier};
