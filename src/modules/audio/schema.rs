use serde::{Deserialize, Serialize};

pub const SOURCE_DATABASE: &str = "database";

/// Scanned in order; the first absent one is reported.
pub const REQUIRED_FIELDS: [&str; 2] = ["language", "audio_url"];

#[derive(Debug, Deserialize)]
pub struct UpsertAudioRequest {
    /// Any JSON value; anything but a supported language string is rejected later.
    pub language: Option<serde_json::Value>,
    pub audio_url: Option<String>,
    pub text: Option<String>,
}

impl UpsertAudioRequest {
    /// `(language, audio_url)`, or the first required field that is absent.
    pub fn required_fields(&self) -> Result<(&serde_json::Value, &str), &'static str> {
        let language = self.language.as_ref().ok_or(REQUIRED_FIELDS[0])?;
        let audio_url = self.audio_url.as_deref().ok_or(REQUIRED_FIELDS[1])?;
        Ok((language, audio_url))
    }
}

#[derive(Debug, Serialize)]
pub struct AudioResponse {
    pub language: String,
    #[serde(rename = "audioUrl")]
    pub audio_url: String,
    pub text: String,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UpsertAudioResponse {
    pub message: String,
    pub language: String,
    pub audio_url: String,
    pub upserted: bool,
}

#[derive(Debug, Serialize)]
pub struct AudioListResponse {
    /// Stored documents in relaxed extended JSON, `_id` removed.
    pub audio_files: Vec<serde_json::Value>,
    pub count: usize,
    pub source: &'static str,
}

impl AudioListResponse {
    pub fn empty() -> Self {
        Self {
            audio_files: Vec::new(),
            count: 0,
            source: SOURCE_DATABASE,
        }
    }
}
