use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::GenerationError;

// OpenAI image generation endpoint
const IMAGES_URL: &str = "https://api.openai.com/v1/images/generations";
const IMAGE_SIZE: &str = "256x256";

/// Prompt sent upstream for a character class.
pub fn avatar_prompt(character_class: &str) -> String {
    format!(
        "d&d character portrait, {}, detailed and colorful, by Larry Elmorer",
        character_class
    )
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: String,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Option<Vec<ImageData>>,
}

#[derive(Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
}

pub struct ImageGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl ImageGenerator {
    pub fn new(api_key: Option<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(60))
            .build()?;

        if api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set, avatar generation will fail upstream");
        }

        Ok(Self {
            client,
            api_key,
            endpoint: IMAGES_URL.to_string(),
        })
    }

    /// Point the generator at another images endpoint, such as a proxy.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Ask the provider for one portrait and return its URL.
    ///
    /// The URL may be empty; the caller decides what that means.
    pub async fn generate(&self, character_class: &str) -> Result<String, GenerationError> {
        let request = ImageRequest {
            prompt: avatar_prompt(character_class),
            n: 1,
            size: IMAGE_SIZE,
        };

        tracing::info!("Requesting avatar for class '{}'", character_class);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or("failed to get response body".to_string());
            return Err(GenerationError::Upstream(format!("{} - {}", status, body)));
        }

        let body: ImageResponse = response.json().await?;
        first_url(body)
    }
}

fn first_url(body: ImageResponse) -> Result<String, GenerationError> {
    let results = body.data.ok_or(GenerationError::NoResult)?;
    Ok(results
        .into_iter()
        .next()
        .and_then(|image| image.url)
        .unwrap_or_default())
}
