//! Telegram Bot API bindings for Rust
//! Provides a blocking client for sending text messages to a chat or channel

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Longest message text the Bot API accepts, in UTF-16 code units
pub const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Bot API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Bot token is empty")]
    EmptyToken,
}

/// Text formatting applied by Telegram to the message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Markdown => "Markdown",
            ParseMode::Html => "HTML",
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'static str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    disable_web_page_preview: bool,
}

/// A message ready to be sent with [`BotClient::send_message`]
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub disable_web_page_preview: bool,
}

impl OutgoingMessage {
    pub fn new(chat_id: &str, text: &str) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
            parse_mode: None,
            disable_web_page_preview: false,
        }
    }

    pub fn with_parse_mode(mut self, parse_mode: Option<ParseMode>) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn with_web_page_preview_disabled(mut self, disabled: bool) -> Self {
        self.disable_web_page_preview = disabled;
        self
    }

    fn payload(&self) -> SendMessagePayload<'_> {
        SendMessagePayload {
            chat_id: &self.chat_id,
            text: &self.text,
            parse_mode: self.parse_mode.map(|m| m.as_str()),
            disable_web_page_preview: self.disable_web_page_preview,
        }
    }
}

pub struct BotClient {
    url: String,
    token: String,
    client: Client,
}

impl BotClient {
    pub fn new(token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        Self::with_api_url(DEFAULT_API_URL, token, timeout)
    }

    /// Create a client against a non-default Bot API server
    pub fn with_api_url(url: &str, token: &str, timeout: Duration) -> Result<Self, TelegramError> {
        if token.trim().is_empty() {
            return Err(TelegramError::EmptyToken);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.url, self.token, method)
    }

    /// Send a text message. Only HTTP 200 counts as delivered.
    pub fn send_message(&self, message: &OutgoingMessage) -> Result<(), TelegramError> {
        // The request URL carries the token and must not reach error text
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .form(&message.payload())
            .send()
            .map_err(|e| TelegramError::RequestError(e.without_url()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .map_err(|e| TelegramError::RequestError(e.without_url()))?;
            return Err(TelegramError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
