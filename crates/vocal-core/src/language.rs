//! Dialogue language selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Language tag attached to a dialogue session.
///
/// Selects the prompt/response templates. Traditional Chinese is accepted
/// as an input tag but responses fall back to Simplified Chinese.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    /// English.
    #[serde(rename = "en")]
    En,
    /// Simplified Chinese.
    #[serde(rename = "zh-Hans")]
    ZhHans,
    /// Traditional Chinese (input only).
    #[serde(rename = "zh-Hant")]
    ZhHant,
}

impl Language {
    /// The language responses are produced in. Traditional Chinese input
    /// maps to Simplified Chinese output.
    pub fn response_language(self) -> Language {
        match self {
            Language::ZhHant => Language::ZhHans,
            other => other,
        }
    }

    /// BCP 47-style tag, used in parser prompts and logs.
    pub fn tag(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::ZhHans => "zh-Hans",
            Language::ZhHant => "zh-Hant",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::En
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "zh-Hans" | "zh-CN" => Ok(Language::ZhHans),
            "zh-Hant" | "zh-TW" => Ok(Language::ZhHant),
            other => Err(format!("Unsupported language tag: '{other}'")),
        }
    }
}
