use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Arabic,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported language: {0}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Arabic];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Arabic => "arabic",
        }
    }

    /// "english, arabic"
    pub fn supported_list() -> String {
        Self::ALL
            .iter()
            .map(|l| l.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str() == s)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct AudioRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub language: String,
    pub audio_url: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<bson::DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<bson::DateTime>,
}

impl AudioRecord {
    /// Both timestamps are stamped now; an upsert overwrites `created_at` too.
    pub fn new(language: Language, audio_url: String, text: String) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: None,
            language: language.as_str().to_string(),
            audio_url,
            text,
            created_at: Some(now),
            updated_at: Some(now),
            migrated_at: None,
        }
    }
}

/// The fields a single-language lookup reads; anything else on the document is ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct StoredAudio {
    pub audio_url: String,
    #[serde(default)]
    pub text: String,
}
