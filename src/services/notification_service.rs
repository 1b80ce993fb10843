use std::io::{self, Write};

use telegram::{BotClient, OutgoingMessage};

use crate::config::{Config, BOT_TOKEN_VAR};
use crate::domain::{MessageFormat, Notification};
use crate::errors::{RelayError, RelayResult};

#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Deliver one notification. No retry on failure.
    fn notify(&self, notification: &Notification) -> RelayResult<()>;
}

/// Posts notifications to a Telegram chat through the Bot API
pub struct TelegramNotifier {
    client: BotClient,
    chat_id: String,
    format: MessageFormat,
    disable_web_page_preview: bool,
}

impl TelegramNotifier {
    pub fn new(config: &Config) -> RelayResult<Self> {
        let token = config
            .telegram
            .bot_token
            .as_deref()
            .ok_or_else(|| RelayError::MissingEnvVar(BOT_TOKEN_VAR.to_string()))?;
        let client = BotClient::new(token, config.request_timeout)?;

        Ok(Self {
            client,
            chat_id: config.telegram.chat_id.clone(),
            format: config.telegram.format,
            disable_web_page_preview: config.telegram.disable_web_page_preview,
        })
    }

    fn message(&self, notification: &Notification) -> OutgoingMessage {
        OutgoingMessage::new(&self.chat_id, &notification.format(self.format))
            .with_parse_mode(self.format.parse_mode())
            .with_web_page_preview_disabled(self.disable_web_page_preview)
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, notification: &Notification) -> RelayResult<()> {
        self.client.send_message(&self.message(notification))?;
        Ok(())
    }
}

/// Prints what would be sent instead of sending it
pub struct ConsoleNotifier {
    format: MessageFormat,
}

impl ConsoleNotifier {
    pub fn new(format: MessageFormat) -> Self {
        Self { format }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) -> RelayResult<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "[DRY RUN] {}\n", notification.format(self.format))?;
        Ok(())
    }
}
