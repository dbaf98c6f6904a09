//! Alert delivery.
//!
//! - `telegram`: Telegram Bot API sender and the [`AlertSender`] seam used by the audit loop
//! - `error`: notification error type

mod error;
mod telegram;

pub use error::NotificationError;
pub use telegram::{AlertSender, TelegramNotifier, TelegramPayloadBuilder, TELEGRAM_API_URL};
