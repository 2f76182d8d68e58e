//! Chat messages, attached code references and their rendered form.

use duet_shared::time::timestamp_to_time_of_day;

use super::error::ChatError;
use super::value_object::Username;

/// Line-ranged snippet attached to a chat message.
///
/// Lines are 1-based and inclusive, `start_line <= end_line`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeReference {
    file: String,
    start_line: u32,
    end_line: u32,
    content: String,
}

impl CodeReference {
    pub fn new(
        file: impl Into<String>,
        start_line: u32,
        end_line: u32,
        content: impl Into<String>,
    ) -> Result<Self, ChatError> {
        if start_line == 0 || start_line > end_line {
            return Err(ChatError::InvalidLineRange {
                start: start_line,
                end: end_line,
            });
        }
        Ok(Self {
            file: file.into(),
            start_line,
            end_line,
            content: content.into(),
        })
    }

    /// Cut `start_line..=end_line` out of a whole source text
    pub fn from_source(
        file: impl Into<String>,
        source: &str,
        start_line: u32,
        end_line: u32,
    ) -> Result<Self, ChatError> {
        let file = file.into();
        if start_line == 0 || start_line > end_line {
            return Err(ChatError::InvalidLineRange {
                start: start_line,
                end: end_line,
            });
        }

        let lines: Vec<&str> = source.lines().collect();
        let line_count = lines.len();
        if end_line as usize > line_count {
            return Err(ChatError::LineRangeOutOfBounds {
                file,
                start: start_line,
                end: end_line,
                line_count,
            });
        }

        let content = lines[start_line as usize - 1..end_line as usize].join("\n");
        Self::new(file, start_line, end_line, content)
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn start_line(&self) -> u32 {
        self.start_line
    }

    pub fn end_line(&self) -> u32 {
        self.end_line
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }

    /// Disclosure label, e.g. `Code (6 lines)`
    pub fn label(&self) -> String {
        format!("Code ({} lines)", self.line_count())
    }
}

/// A received chat message. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    username: Username,
    text: String,
    color: String,
    timestamp: i64,
    reference: Option<CodeReference>,
}

impl ChatMessage {
    pub fn new(
        username: Username,
        text: impl Into<String>,
        color: impl Into<String>,
        timestamp: i64,
        reference: Option<CodeReference>,
    ) -> Self {
        Self {
            username,
            text: text.into(),
            color: color.into(),
            timestamp,
            reference,
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn reference(&self) -> Option<&CodeReference> {
        self.reference.as_ref()
    }

    /// Build the view shown in the message list
    pub fn render(&self, known_usernames: &[String], trigger: char) -> ChatMessageView {
        ChatMessageView {
            username: self.username.as_str().to_string(),
            color: self.color.clone(),
            time_label: timestamp_to_time_of_day(self.timestamp),
            body: highlight_mentions(&self.text, known_usernames, trigger),
            code: self.reference.as_ref().map(CodeBlockView::collapsed),
        }
    }
}

/// Piece of a rendered message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSpan {
    Plain(String),
    /// Trigger plus a known username, e.g. `@Alice`
    Mention(String),
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Split `text` into plain runs and mentions of known usernames.
///
/// A mention starts with the trigger at a word boundary and matches the
/// longest known username that is not followed by another name character.
/// Unknown names stay plain text.
pub fn highlight_mentions(text: &str, known_usernames: &[String], trigger: char) -> Vec<TextSpan> {
    let chars: Vec<char> = text.chars().collect();
    let mut names: Vec<Vec<char>> = known_usernames
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| name.chars().collect())
        .collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));

    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut index = 0;

    while index < chars.len() {
        let at_boundary = index == 0 || chars[index - 1].is_whitespace();
        if chars[index] == trigger && at_boundary {
            let rest = &chars[index + 1..];
            let matched = names.iter().find(|name| {
                rest.starts_with(name)
                    && rest.get(name.len()).is_none_or(|next| !is_name_char(*next))
            });
            if let Some(name) = matched {
                if !plain.is_empty() {
                    spans.push(TextSpan::Plain(std::mem::take(&mut plain)));
                }
                let mut mention = String::new();
                mention.push(trigger);
                mention.extend(name.iter());
                spans.push(TextSpan::Mention(mention));
                index += 1 + name.len();
                continue;
            }
        }
        plain.push(chars[index]);
        index += 1;
    }

    if !plain.is_empty() {
        spans.push(TextSpan::Plain(plain));
    }
    spans
}

/// Collapsible code block under a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockView {
    pub label: String,
    pub file: String,
    pub start_line: u32,
    pub end_line: u32,
    pub content: String,
    pub expanded: bool,
}

impl CodeBlockView {
    fn collapsed(reference: &CodeReference) -> Self {
        Self {
            label: reference.label(),
            file: reference.file().to_string(),
            start_line: reference.start_line(),
            end_line: reference.end_line(),
            content: reference.content().to_string(),
            expanded: false,
        }
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Literal content, only while expanded
    pub fn visible_content(&self) -> Option<&str> {
        self.expanded.then_some(self.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessageView {
    pub username: String,
    pub color: String,
    pub time_label: String,
    pub body: Vec<TextSpan>,
    pub code: Option<CodeBlockView>,
}
