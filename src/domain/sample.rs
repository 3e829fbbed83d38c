use serde::{Deserialize, Serialize};

/// One labelled multimodal sample: a tweet plus the textual
/// description of the image attached to it.
///
/// The image side of the pair is a *description*, not pixels —
/// both modalities go through the same text encoder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetSample {
    /// Raw tweet text
    pub tweet: String,

    /// Textual description of the attached image
    pub image_description: String,

    /// Binary class label: 0 (negative) or 1 (positive)
    pub label: usize,
}

impl TweetSample {
    pub fn new(
        tweet: impl Into<String>,
        image_description: impl Into<String>,
        label: usize,
    ) -> Self {
        Self {
            tweet: tweet.into(),
            image_description: image_description.into(),
            label,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_label() {
        let s = TweetSample::new("a tweet", "a photo of a dog", 1);
        assert!(s.is_positive());
        assert!(!TweetSample::new("b", "c", 0).is_positive());
    }

    #[test]
    fn test_deserialize_from_json_line() {
        let line = r#"{"tweet": "hi", "image_description": "a cat", "label": 0}"#;
        let s: TweetSample = serde_json::from_str(line).unwrap();
        assert_eq!(s.tweet, "hi");
        assert_eq!(s.image_description, "a cat");
        assert_eq!(s.label, 0);
    }
}
