use linkhop_shortener::ShortenedUrl;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub url: String,
    #[serde(default)]
    pub custom_alias: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
}

impl From<ShortenedUrl> for CreateUrlResponse {
    fn from(url: ShortenedUrl) -> Self {
        Self {
            short_code: url.short_code,
            short_url: url.short_url,
            original_url: url.original_url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
