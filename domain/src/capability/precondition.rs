//! Structured preconditions checked by the precondition gate.
//!
//! The only shape currently recognised is the three-part user story
//! `{role, want, benefit}`. It may arrive either as an object with those
//! three string fields or as a sentence:
//!
//! ```text
//! As a <role>, I want <want>, so that <benefit>.
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;

static USER_STORY_SENTENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*as\s+an?\s+(?P<role>.+?)\s*,\s*i\s+want\s+(?:to\s+)?(?P<want>.+?)\s*,?\s+so\s+that\s+(?P<benefit>.+?)\s*\.?\s*$")
        .expect("user story pattern is valid")
});

/// A user story in `{role, want, benefit}` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStory {
    pub role: String,
    pub want: String,
    pub benefit: String,
}

impl UserStory {
    /// Validate and extract a user story from a parameter value.
    pub fn parse(value: &Value) -> Result<Self, String> {
        match value {
            Value::Object(map) => {
                let field = |name: &str| -> Result<String, String> {
                    match map.get(name) {
                        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
                        Some(Value::String(_)) => Err(format!("user story field '{}' is empty", name)),
                        Some(_) => Err(format!("user story field '{}' must be a string", name)),
                        None => Err(format!("user story is missing '{}'", name)),
                    }
                };
                Ok(Self {
                    role: field("role")?,
                    want: field("want")?,
                    benefit: field("benefit")?,
                })
            }
            Value::String(text) => Self::parse_sentence(text),
            _ => Err("user story must be an object {role, want, benefit} or a sentence".into()),
        }
    }

    fn parse_sentence(text: &str) -> Result<Self, String> {
        let caps = USER_STORY_SENTENCE.captures(text).ok_or_else(|| {
            format!(
                "'{}' is not of the form 'As a <role>, I want <want>, so that <benefit>'",
                text.trim()
            )
        })?;
        Ok(Self {
            role: caps["role"].trim().to_string(),
            want: caps["want"].trim().to_string(),
            benefit: caps["benefit"].trim().to_string(),
        })
    }
}
