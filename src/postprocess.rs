use std::io::Cursor;

use base64::prelude::*;
use image::{imageops, imageops::FilterType, ImageOutputFormat, RgbImage};

use crate::{
    config::PostprocessConfig,
    error::{ImitateError, Result},
};

/// Quantize each channel to `2^bits` evenly spaced levels by masking off
/// the low bits. Pure per-pixel operation, idempotent at a fixed depth.
pub fn posterize(img: &mut RgbImage, bits: u8) {
    let mask = 0xFFu8 << (8 - bits);
    for pixel in img.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel &= mask;
        }
    }
}

/// Nearest-neighbor downscale by `factor` (integer division, truncating),
/// then nearest-neighbor upscale back to the exact original dimensions so
/// non-divisor factors never drift the output size.
pub fn pixelate(img: &RgbImage, factor: u32) -> RgbImage {
    if factor <= 1 {
        return img.clone();
    }

    let (width, height) = img.dimensions();
    let down_w = (width / factor).max(1);
    let down_h = (height / factor).max(1);

    let small = imageops::resize(img, down_w, down_h, FilterType::Nearest);
    imageops::resize(&small, width, height, FilterType::Nearest)
}

/// Posterize then pixelate one decoded image.
pub fn apply_filters(mut img: RgbImage, config: &PostprocessConfig) -> RgbImage {
    posterize(&mut img, config.posterize_bits);
    pixelate(&img, config.downscale_factor)
}

/// Apply the filters independently to each image, preserving batch order.
/// A single undecodable image fails the whole batch, attributed to its
/// index; there is no partial output.
pub fn batch_post_process(images: &[String], config: &PostprocessConfig) -> Result<Vec<String>> {
    if config.posterize_bits < 1 || config.posterize_bits > 8 {
        return Err(ImitateError::InvalidInput(format!(
            "posterize_bits must be in [1, 8], got {}",
            config.posterize_bits
        )));
    }
    if config.downscale_factor < 1 {
        return Err(ImitateError::InvalidInput(
            "downscale_factor must be >= 1".to_string(),
        ));
    }

    log::debug!(
        "Post-processing {} image(s) (downscale {}, {} bits)",
        images.len(),
        config.downscale_factor,
        config.posterize_bits
    );

    let mut processed = Vec::with_capacity(images.len());
    for (index, image_b64) in images.iter().enumerate() {
        let img = decode_b64_image(image_b64)
            .map_err(|reason| ImitateError::Decode { index, reason })?;
        let filtered = apply_filters(img, config);
        processed.push(encode_png_b64(&filtered)?);
    }

    Ok(processed)
}

fn decode_b64_image(image_b64: &str) -> std::result::Result<RgbImage, String> {
    let bytes = BASE64_STANDARD
        .decode(image_b64)
        .map_err(|e| e.to_string())?;
    let img = image::load_from_memory(&bytes).map_err(|e| e.to_string())?;
    // Alpha, if the backend produced any, is dropped here.
    Ok(img.to_rgb8())
}

fn encode_png_b64(img: &RgbImage) -> Result<String> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| ImitateError::Encode(e.to_string()))?;
    Ok(BASE64_STANDARD.encode(bytes))
}
