use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::domain::{FeedConfig, FeedGroup, KeywordSet, MessageFormat};
use crate::errors::{RelayError, RelayResult};

pub const BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Only needed to actually send, so `list` and dry runs work without it
    pub bot_token: Option<String>,
    pub chat_id: String,
    pub format: MessageFormat,
    pub disable_web_page_preview: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Feeds of every group, in configured order
    pub feeds: Vec<FeedConfig>,
    pub keywords: KeywordSet,
    pub state_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: String,
    /// Minimum spacing between two outgoing messages
    pub send_interval: Duration,
    /// How far back a feed with no stored timestamp is scanned
    pub lookback: chrono::Duration,
    pub request_timeout: Duration,
    pub telegram: TelegramConfig,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    feeds: FeedsSection,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default = "default_state_path")]
    state_path: PathBuf,
    #[serde(default = "default_log_path")]
    log_path: PathBuf,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_send_interval_secs")]
    send_interval_secs: u64,
    #[serde(default = "default_lookback_hours")]
    lookback_hours: u32,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
    #[serde(default)]
    telegram: TelegramSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedsSection {
    #[serde(default)]
    all: Vec<FeedSection>,
    #[serde(default)]
    keyword_filtered: Vec<FeedSection>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FeedSection {
    name: String,
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TelegramSection {
    #[serde(default, deserialize_with = "deserialize_chat_id")]
    chat_id: Option<String>,
    #[serde(default)]
    parse_mode: MessageFormat,
    #[serde(default)]
    disable_web_page_preview: bool,
}

fn default_state_path() -> PathBuf {
    PathBuf::from("timestamps.json")
}

fn default_log_path() -> PathBuf {
    PathBuf::from("feed-relay.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_send_interval_secs() -> u64 {
    5
}

fn default_lookback_hours() -> u32 {
    24
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Chat ids are numeric for channels and groups but `@username` for public
/// channels, so YAML may hold either
fn deserialize_chat_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ChatIdVisitor;

    impl<'de> Visitor<'de> for ChatIdVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a chat id as string or integer")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v.to_string()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ChatIdVisitor)
}

/// Load `.env` from the executable's directory first, then the working
/// directory. Variables already set in the environment win.
pub fn load_dotenv() {
    if let Some(dir) = exe_dir() {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path).ok();
        }
    }
    dotenvy::dotenv().ok();
}

/// Get the directory where the executable is located
fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
}

impl Config {
    /// Read the YAML file at `path`, taking secrets from the process
    /// environment
    pub fn load(path: &Path) -> RelayResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            RelayError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_yaml(&content, base_dir, |name| std::env::var(name).ok())
    }

    /// Build a config from YAML text. Relative paths are resolved against
    /// `base_dir`; `env` looks up secrets by variable name.
    pub fn from_yaml<E>(content: &str, base_dir: &Path, env: E) -> RelayResult<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let file: ConfigFile = serde_yaml::from_str(content)?;

        let bot_token = env(BOT_TOKEN_VAR).filter(|t| !t.trim().is_empty());

        let chat_id = env(CHAT_ID_VAR)
            .filter(|c| !c.trim().is_empty())
            .or(file.telegram.chat_id)
            .ok_or_else(|| {
                RelayError::Config(format!(
                    "telegram.chat_id is not set and {} is missing",
                    CHAT_ID_VAR
                ))
            })?;

        let feeds = collect_feeds(file.feeds)?;

        Ok(Self {
            feeds,
            keywords: KeywordSet::new(&file.keywords),
            state_path: resolve(base_dir, file.state_path),
            log_path: resolve(base_dir, file.log_path),
            log_level: file.log_level,
            send_interval: Duration::from_secs(file.send_interval_secs),
            lookback: chrono::Duration::hours(i64::from(file.lookback_hours)),
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                format: file.telegram.parse_mode,
                disable_web_page_preview: file.telegram.disable_web_page_preview,
            },
        })
    }

    /// Feeds of one group in configured order
    pub fn feeds_in(&self, group: FeedGroup) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter().filter(move |f| f.group == group)
    }
}

fn resolve(base_dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}

fn collect_feeds(section: FeedsSection) -> RelayResult<Vec<FeedConfig>> {
    let grouped = section
        .all
        .into_iter()
        .map(|f| (f, FeedGroup::All))
        .chain(
            section
                .keyword_filtered
                .into_iter()
                .map(|f| (f, FeedGroup::KeywordFiltered)),
        );

    // Names key the timestamp map, so they must be unique across groups
    let mut seen = HashSet::new();
    let mut feeds = Vec::new();

    for (feed, group) in grouped {
        let name = feed.name.trim();
        if name.is_empty() {
            return Err(RelayError::Config(format!(
                "feed with url {} has an empty name",
                feed.url
            )));
        }
        if !seen.insert(name.to_string()) {
            return Err(RelayError::Config(format!("duplicate feed name: {}", name)));
        }
        validate_url(&feed.url)?;

        feeds.push(FeedConfig::new(name, &feed.url, group));
    }

    Ok(feeds)
}

fn validate_url(url: &str) -> RelayResult<()> {
    let parsed = Url::parse(url).map_err(|e| RelayError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(RelayError::InvalidUrl(format!(
            "{}: unsupported scheme {}",
            url, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
feeds:
  all:
    - name: NYT
      url: http://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml
    - name: BBC
      url: http://feeds.bbci.co.uk/news/rss.xml
  keyword_filtered:
    - name: Reuters
      url: https://example.com/reuters.xml
keywords: [financial, Stock, crypto]
telegram:
  chat_id: -10034107254734
  parse_mode: html
"#;

    fn env_with_token(name: &str) -> Option<String> {
        match name {
            BOT_TOKEN_VAR => Some("123:abc".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_parse_sample_config() {
        let config = Config::from_yaml(SAMPLE, Path::new("/etc/relay"), env_with_token).unwrap();

        assert_eq!(config.feeds.len(), 3);
        let all: Vec<_> = config.feeds_in(FeedGroup::All).map(|f| f.name.as_str()).collect();
        assert_eq!(all, vec!["NYT", "BBC"]);
        let filtered: Vec<_> = config
            .feeds_in(FeedGroup::KeywordFiltered)
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(filtered, vec!["Reuters"]);

        assert!(config.keywords.matches("STOCK split"));
        assert_eq!(config.telegram.chat_id, "-10034107254734");
        assert_eq!(config.telegram.format, MessageFormat::Html);
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_yaml(SAMPLE, Path::new("/etc/relay"), env_with_token).unwrap();

        assert_eq!(config.state_path, PathBuf::from("/etc/relay/timestamps.json"));
        assert_eq!(config.log_path, PathBuf::from("/etc/relay/feed-relay.log"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.send_interval, Duration::from_secs(5));
        assert_eq!(config.lookback, chrono::Duration::hours(24));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(!config.telegram.disable_web_page_preview);
    }

    #[test]
    fn test_absolute_paths_kept() {
        let yaml = "state_path: /var/lib/relay/state.json\ntelegram:\n  chat_id: \"@news\"\n";
        let config = Config::from_yaml(yaml, Path::new("/etc/relay"), env_with_token).unwrap();

        assert_eq!(config.state_path, PathBuf::from("/var/lib/relay/state.json"));
        assert_eq!(config.telegram.chat_id, "@news");
        assert!(config.feeds.is_empty());
    }

    #[test]
    fn test_token_optional_at_load() {
        let config = Config::from_yaml(SAMPLE, Path::new(""), |_| None).unwrap();
        assert_eq!(config.telegram.bot_token, None);

        let config = Config::from_yaml(SAMPLE, Path::new(""), |name| match name {
            BOT_TOKEN_VAR => Some("  ".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.telegram.bot_token, None);
    }

    #[test]
    fn test_chat_id_from_env_overrides_file() {
        let config = Config::from_yaml(SAMPLE, Path::new(""), |name| match name {
            BOT_TOKEN_VAR => Some("123:abc".to_string()),
            CHAT_ID_VAR => Some("@override".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.telegram.chat_id, "@override");
    }

    #[test]
    fn test_missing_chat_id() {
        let result = Config::from_yaml("keywords: []\n", Path::new(""), env_with_token);
        assert!(matches!(result, Err(RelayError::Config(_))));
    }

    #[test]
    fn test_duplicate_name_across_groups_rejected() {
        let yaml = r#"
feeds:
  all:
    - name: NYT
      url: https://example.com/a.xml
  keyword_filtered:
    - name: NYT
      url: https://example.com/b.xml
telegram:
  chat_id: 1
"#;
        let result = Config::from_yaml(yaml, Path::new(""), env_with_token);
        assert!(matches!(result, Err(RelayError::Config(msg)) if msg.contains("NYT")));
    }

    #[test]
    fn test_invalid_url_rejected() {
        let yaml = r#"
feeds:
  all:
    - name: Local
      url: file:///tmp/feed.xml
telegram:
  chat_id: 1
"#;
        let result = Config::from_yaml(yaml, Path::new(""), env_with_token);
        assert!(matches!(result, Err(RelayError::InvalidUrl(_))));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "telegram:\n  chat_id: 1\nkeywordz: [x]\n";
        let result = Config::from_yaml(yaml, Path::new(""), env_with_token);
        assert!(matches!(result, Err(RelayError::Yaml(_))));
    }
}
