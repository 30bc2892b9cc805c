use crate::{
    config::SdConfig,
    error::Result,
    models::Img2ImgRequest,
    postprocess,
    sd::ImageGenerator,
};

/// Run the whole pipeline: build the request, call the backend once, then
/// posterize and pixelate every returned image. Strictly sequential; the
/// backend call completes (or fails) before any post-processing starts.
pub async fn imitate<G>(
    generator: &G,
    config: &SdConfig,
    prompt: &str,
    image_b64: &str,
    amount: u32,
) -> Result<Vec<String>>
where
    G: ImageGenerator,
{
    let request = Img2ImgRequest::new(prompt, image_b64, amount, config.preset)?;
    let images = generator.generate(&request).await?;
    postprocess::batch_post_process(&images, &config.postprocess)
}
