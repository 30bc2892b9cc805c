use serde::{Deserialize, Serialize};

/// The slice of the WebUI img2img response this tool cares about. The
/// backend returns additional fields (parameters, info) that are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Img2ImgResponse {
    pub images: Vec<String>,
}

/// The single JSON document read from stdin.
#[derive(Debug, Clone, Deserialize)]
pub struct ImitateInput {
    pub prompt: String,
    pub image_b64: String,
    pub amount: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_parses_the_documented_shape() {
        let input: ImitateInput =
            serde_json::from_str(r#"{"prompt": "a cat", "image_b64": "aGVsbG8=", "amount": 2}"#)
                .unwrap();
        assert_eq!(input.prompt, "a cat");
        assert_eq!(input.amount, 2);
    }

    #[test]
    fn input_with_missing_field_fails() {
        let result = serde_json::from_str::<ImitateInput>(r#"{"prompt": "a cat"}"#);
        assert!(result.is_err());
    }
}
