use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(ChatRole::User),
            "assistant" => Ok(ChatRole::Assistant),
            other => Err(format!("Unknown chat role: {}", other)),
        }
    }
}

/// One entry of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }

    /// Content split into plain and `**bold**` runs
    pub fn segments(&self) -> Vec<TextSegment> {
        markup_segments(&self.content)
    }
}

/// A run of message text with uniform emphasis
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub bold: bool,
}

/// Split text on `**` markers into alternating plain and bold runs
///
/// An unmatched trailing `**` is kept as literal text.
pub fn markup_segments(content: &str) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut rest = content;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            segments.push(TextSegment {
                text: rest[..start].to_string(),
                bold: false,
            });
        }
        if end > 0 {
            segments.push(TextSegment {
                text: after[..end].to_string(),
                bold: true,
            });
        }
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        segments.push(TextSegment {
            text: rest.to_string(),
            bold: false,
        });
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> TextSegment {
        TextSegment {
            text: text.to_string(),
            bold: false,
        }
    }

    fn bold(text: &str) -> TextSegment {
        TextSegment {
            text: text.to_string(),
            bold: true,
        }
    }

    #[test]
    fn test_markup_bold_runs() {
        assert_eq!(
            markup_segments("Your **HbA1c** is **6.1%** today"),
            vec![
                plain("Your "),
                bold("HbA1c"),
                plain(" is "),
                bold("6.1%"),
                plain(" today")
            ]
        );
    }

    #[test]
    fn test_markup_unmatched_marker_is_literal() {
        assert_eq!(markup_segments("a ** b"), vec![plain("a ** b")]);
    }

    #[test]
    fn test_markup_plain_and_empty() {
        assert_eq!(markup_segments("hello"), vec![plain("hello")]);
        assert!(markup_segments("").is_empty());
        assert!(markup_segments("****").is_empty());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("user".parse::<ChatRole>().unwrap(), ChatRole::User);
        assert_eq!("assistant".parse::<ChatRole>().unwrap(), ChatRole::Assistant);
        assert!("system".parse::<ChatRole>().is_err());
    }
}
