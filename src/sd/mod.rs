pub mod img2img_client;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Img2ImgRequest;

pub use img2img_client::SdClient;

/// Capability boundary around the generation backend. The pipeline only
/// depends on this trait, so tests can substitute a canned generator.
#[async_trait]
pub trait ImageGenerator {
    /// Submit one request and return the generated images, base64-encoded,
    /// in the order the backend produced them.
    async fn generate(&self, request: &Img2ImgRequest) -> Result<Vec<String>>;
}
