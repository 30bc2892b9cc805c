pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod pipeline;
pub mod postprocess;
pub mod sd;

pub use config::{PostprocessConfig, SdConfig};
pub use error::{ImitateError, Result};
pub use models::{EditPreset, ImitateInput, Img2ImgRequest};
pub use pipeline::imitate;
pub use sd::{ImageGenerator, SdClient};
