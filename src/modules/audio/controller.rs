use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use bson::Bson;

use crate::error::ApiError;
use crate::modules::audio::{
    crud::AudioCrud,
    model::{AudioRecord, Language},
    schema::{
        AudioListResponse, AudioResponse, UpsertAudioRequest, UpsertAudioResponse,
        SOURCE_DATABASE,
    },
};
use crate::AppState;

pub async fn get_audio(
    State(state): State<AppState>,
    Path(language): Path<String>,
) -> Result<Json<AudioResponse>, ApiError> {
    let language: Language = language.parse()?;

    // Without a database there is nothing to find
    let store = state.store().ok_or(ApiError::NotFound(language))?;
    let crud = AudioCrud::new(store);

    let record = crud
        .find_by_language(language)
        .await?
        .ok_or(ApiError::NotFound(language))?;

    Ok(Json(AudioResponse {
        language: language.to_string(),
        audio_url: record.audio_url,
        text: record.text,
        source: SOURCE_DATABASE,
    }))
}

pub async fn list_audio(State(state): State<AppState>) -> Result<Json<AudioListResponse>, ApiError> {
    let Some(store) = state.store() else {
        return Ok(Json(AudioListResponse::empty()));
    };

    let documents = AudioCrud::new(store).find_all().await?;
    let audio_files: Vec<serde_json::Value> = documents
        .into_iter()
        .map(|d| Bson::Document(d).into_relaxed_extjson())
        .collect();

    Ok(Json(AudioListResponse {
        count: audio_files.len(),
        audio_files,
        source: SOURCE_DATABASE,
    }))
}

pub async fn upsert_audio(
    State(state): State<AppState>,
    payload: Result<Json<UpsertAudioRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UpsertAudioResponse>), ApiError> {
    let store = state.store().ok_or(ApiError::Unavailable)?;

    let Json(payload) = payload.map_err(|e| ApiError::InvalidBody(e.body_text()))?;

    let (language, audio_url) = payload
        .required_fields()
        .map_err(ApiError::MissingField)?;
    let language: Language = language
        .as_str()
        .ok_or(ApiError::InvalidLanguage)?
        .parse()?;
    let audio_url = audio_url.to_string();

    let record = AudioRecord::new(language, audio_url, payload.text.unwrap_or_default());
    let outcome = AudioCrud::new(store).upsert(&record).await?;

    tracing::info!(%language, outcome = outcome.as_str(), "audio record upserted");

    Ok((
        StatusCode::CREATED,
        Json(UpsertAudioResponse {
            message: format!("Audio data for {} uploaded successfully", language),
            language: record.language,
            audio_url: record.audio_url,
            upserted: outcome.is_inserted(),
        }),
    ))
}
