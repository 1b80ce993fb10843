use serde::Deserialize;
use telegram::{ParseMode, MAX_MESSAGE_LEN};

use super::Entry;

/// How message text is marked up for Telegram
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[default]
    Markdown,
    Html,
    Plain,
}

impl MessageFormat {
    pub fn parse_mode(&self) -> Option<ParseMode> {
        match self {
            MessageFormat::Markdown => Some(ParseMode::Markdown),
            MessageFormat::Html => Some(ParseMode::Html),
            MessageFormat::Plain => None,
        }
    }

    fn escape_into(&self, c: char, out: &mut String) {
        match (self, c) {
            (MessageFormat::Markdown, c) if is_markdown_special(c) => {
                out.push('\\');
                out.push(c);
            }
            (MessageFormat::Html, '&') => out.push_str("&amp;"),
            (MessageFormat::Html, '<') => out.push_str("&lt;"),
            (MessageFormat::Html, '>') => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }

    pub fn escape(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            self.escape_into(c, &mut out);
        }
        out
    }

    fn bold(&self, text: &str) -> String {
        match self {
            MessageFormat::Markdown => markdown_bold(text),
            MessageFormat::Html => format!("<b>{}</b>", self.escape(text)),
            MessageFormat::Plain => text.to_string(),
        }
    }
}

fn is_markdown_special(c: char) -> bool {
    matches!(c, '_' | '*' | '`' | '[')
}

/// Legacy Markdown allows no escapes inside an entity, so every special
/// character is escaped between two bold runs: `2*2` becomes `*2*\**2*`.
fn markdown_bold(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    let mut run = String::new();

    for c in text.chars() {
        if is_markdown_special(c) {
            push_bold_run(&mut out, &mut run);
            out.push('\\');
            out.push(c);
        } else {
            run.push(c);
        }
    }
    push_bold_run(&mut out, &mut run);

    out
}

fn push_bold_run(out: &mut String, run: &mut String) {
    if !run.is_empty() {
        out.push('*');
        out.push_str(run);
        out.push('*');
        run.clear();
    }
}

/// Length as the Bot API measures message text
fn api_len(text: &str) -> usize {
    text.encode_utf16().count()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub title: String,
    pub link: String,
    pub description: String,
}

impl Notification {
    pub fn new(title: &str, link: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            link: link.to_string(),
            description: description.to_string(),
        }
    }

    pub fn from_entry(entry: &Entry) -> Self {
        Self::new(&entry.title, &entry.link, &entry.description)
    }

    /// Format: bold title, link on the next line, then a blank line and the
    /// description. Title and description are cut to keep the whole message
    /// within the Bot API limit.
    pub fn format(&self, format: MessageFormat) -> String {
        let link = if self.link.is_empty() {
            String::new()
        } else {
            format!("\n{}", format.escape(&self.link))
        };

        let title_budget = MAX_MESSAGE_LEN.saturating_sub(api_len(&link));
        let mut head = fit(&self.title, title_budget, |t| format.bold(t));
        head.push_str(&link);

        if self.description.is_empty() {
            return head;
        }

        let budget = MAX_MESSAGE_LEN.saturating_sub(api_len(&head) + 2);
        let body = fit(&self.description, budget, |d| format.escape(d));
        if body.is_empty() {
            return head;
        }

        format!("{}\n\n{}", head, body)
    }
}

/// Render `text`, or the longest prefix of it followed by an ellipsis, so
/// that the result is at most `max_len` long. Empty when not even the
/// ellipsis fits. Prefixes end on whole characters, so escapes are never
/// split.
fn fit<R>(text: &str, max_len: usize, render: R) -> String
where
    R: Fn(&str) -> String,
{
    let full = render(text);
    if api_len(&full) <= max_len {
        return full;
    }

    let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let cut = |chars: usize| {
        let end = bounds.get(chars).copied().unwrap_or(text.len());
        render(&format!("{}…", &text[..end]))
    };

    if api_len(&cut(0)) > max_len {
        return String::new();
    }

    // The rendered length only grows with the prefix, so bisect on it
    let (mut lo, mut hi) = (0, bounds.len());
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if api_len(&cut(mid)) <= max_len {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    cut(lo)
}
