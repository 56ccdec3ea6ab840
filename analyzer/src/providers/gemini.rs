use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use strum::{AsRefStr, EnumString};

use common::{AnalysisRequest, AnalysisResult, ServiceError};

use super::cleaner::try_parse_json_with_trailing_comma_removal;
use super::core::{check_result, AnalysisProvider};
use super::prompter::build_prompt;

#[derive(Default, Debug, EnumString, AsRefStr, PartialEq, Eq)]
pub enum GeminiModel {
    #[default]
    #[strum(serialize = "gemini-2.0-flash-lite")]
    Gemini2FlashLite,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini2Flash,
}

// --- Gemini wire format ---

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Content {
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: String,
}

/// Production analysis provider backed by the Gemini `generateContent`
/// endpoint. The chart goes along as an `inlineData` part next to the
/// prompt; the model is asked for a JSON body matching the response schema.
pub struct GeminiProvider {
    pub client: Arc<Client>,
    pub api_url: String,
    pub api_key: String,
    pub model: GeminiModel,
}

impl GeminiProvider {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        GeminiProvider {
            client: Arc::new(Client::new()),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            model: GeminiModel::default(),
        }
    }

    pub fn new_v1beta(api_key: &str) -> Self {
        GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/models/",
            api_key,
        )
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl AnalysisProvider for GeminiProvider {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ServiceError> {
        let model_str = self.model.as_ref();
        let gemini_api_url = format!(
            "{}{}:generateContent?key={}",
            self.api_url, model_str, self.api_key
        );

        let prompt = build_prompt(request);
        let payload_json = json!({
            "contents": [{
              "parts":[
                {"text": prompt},
                {"inlineData": {
                    "mimeType": request.image.mime_type,
                    "data": request.image.data,
                }}
              ]
            }],
            "generationConfig": {
                "response_mime_type": "application/json",
            }
        });

        debug!("calling {model_str} for chart analysis");
        let response = self
            .client
            .post(gemini_api_url)
            .json(&payload_json)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ServiceError::Status(response.status().as_u16()));
        }

        let raw_text_response = response.text().await?;
        extract_result(&raw_text_response)
    }
}

/// Pulls the analysis out of a raw Gemini response body: first candidate,
/// first part, then the part text parsed as an [`AnalysisResult`].
fn extract_result(raw_text_response: &str) -> Result<AnalysisResult, ServiceError> {
    let raw_response: GeminiResponse = serde_json::from_str(raw_text_response).map_err(|e| {
        ServiceError::MalformedResponse(format!("unexpected response envelope: {e}"))
    })?;

    let output_string = raw_response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.parts.first())
        .map(|part| part.text.clone())
        .ok_or_else(|| {
            ServiceError::MalformedResponse("no text output in response".to_string())
        })?;

    let parsed_output: AnalysisResult =
        try_parse_json_with_trailing_comma_removal(&output_string)?;
    check_result(parsed_output)
}
