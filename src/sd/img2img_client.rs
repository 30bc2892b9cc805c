use async_trait::async_trait;

use crate::{
    config::SdConfig,
    error::{ImitateError, Result},
    models::{Img2ImgRequest, Img2ImgResponse},
    sd::ImageGenerator,
};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:7860";
const IMG2IMG_PATH: &str = "/sdapi/v1/img2img";

/// Client for the Stable Diffusion WebUI img2img endpoint. One synchronous
/// round trip per request; retry and timeout policy are left to the caller
/// and the transport defaults.
#[derive(Clone)]
pub struct SdClient {
    base_url: String,
    http: reqwest::Client,
}

impl SdClient {
    pub fn new(config: &SdConfig) -> Self {
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ImageGenerator for SdClient {
    async fn generate(&self, request: &Img2ImgRequest) -> Result<Vec<String>> {
        let url = format!("{}{}", self.base_url, IMG2IMG_PATH);

        log::info!(
            "Requesting {} image(s) from {} ({} steps, denoising {})",
            request.batch_size,
            url,
            request.steps,
            request.denoising_strength
        );

        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ImitateError::ServiceStatus {
                status: status.as_u16(),
                body,
            });
        }

        let images = parse_images(&body)?;
        log::info!("Backend returned {} image(s)", images.len());
        Ok(images)
    }
}

/// Pull the `images` array out of a response body. The sequence is passed
/// through verbatim; its length is not checked against the requested
/// batch size.
fn parse_images(body: &str) -> Result<Vec<String>> {
    let response: Img2ImgResponse = serde_json::from_str(body)
        .map_err(|e| ImitateError::MalformedResponse(e.to_string()))?;
    Ok(response.images)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_images_array_in_order() {
        let body = r#"{"images": ["aaa", "bbb"], "parameters": {}, "info": ""}"#;
        let images = parse_images(body).unwrap();
        assert_eq!(images, vec!["aaa".to_string(), "bbb".to_string()]);
    }

    #[test]
    fn empty_images_array_passes_through() {
        let images = parse_images(r#"{"images": []}"#).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn missing_images_field_is_a_malformed_response() {
        let err = parse_images(r#"{"parameters": {}}"#).unwrap_err();
        match err {
            ImitateError::MalformedResponse(msg) => assert!(msg.contains("images")),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn non_json_body_is_a_malformed_response() {
        let err = parse_images("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ImitateError::MalformedResponse(_)));
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let config = crate::config::SdConfig::new().with_base_url("http://localhost:7860/");
        let client = SdClient::new(&config);
        assert_eq!(client.base_url(), "http://localhost:7860");
    }
}
