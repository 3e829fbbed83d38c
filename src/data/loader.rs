// ============================================================
// Layer 4 — JSONL Sample Loader
// ============================================================
// Loads labelled samples from a JSON-lines file, one object
// per line:
//
//   {"tweet": "...", "image_description": "...", "label": 1}
//
// Malformed lines and out-of-range labels are skipped with a
// warning rather than aborting the whole load — one bad row in
// a scraped dataset should not kill a training run.

use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::domain::sample::TweetSample;
use crate::domain::traits::SampleSource;

/// Loads all samples from a single .jsonl file.
/// Implements the SampleSource trait from Layer 3.
pub struct JsonlLoader {
    path: String,
}

impl JsonlLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl SampleSource for JsonlLoader {
    fn load_all(&self) -> Result<Vec<TweetSample>> {
        let path = Path::new(&self.path);

        let content = fs::read_to_string(path)
            .with_context(|| format!("Cannot read dataset file '{}'", self.path))?;

        let mut samples = Vec::new();

        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<TweetSample>(line) {
                Ok(sample) if sample.label <= 1 => samples.push(sample),
                Ok(sample) => {
                    tracing::warn!(
                        "Skipping line {} of '{}': label {} is not binary",
                        line_no + 1,
                        self.path,
                        sample.label
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping line {} of '{}': {}",
                        line_no + 1,
                        self.path,
                        e
                    );
                }
            }
        }

        tracing::info!("Loaded {} samples from '{}'", samples.len(), self.path);
        Ok(samples)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, content: &str) -> String {
        let path = std::env::temp_dir().join(name);
        let mut f = fs::File::create(&path).unwrap();
        write!(f, "{content}").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_loads_valid_lines() {
        let path = write_temp(
            "tweet_fusion_loader_valid.jsonl",
            concat!(
                r#"{"tweet": "a", "image_description": "b", "label": 0}"#, "\n",
                r#"{"tweet": "c", "image_description": "d", "label": 1}"#, "\n",
            ),
        );
        let samples = JsonlLoader::new(&path).load_all().unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].label, 1);
    }

    #[test]
    fn test_skips_malformed_and_bad_labels() {
        let path = write_temp(
            "tweet_fusion_loader_bad.jsonl",
            concat!(
                "not json at all\n",
                r#"{"tweet": "a", "image_description": "b", "label": 7}"#, "\n",
                r#"{"tweet": "c", "image_description": "d", "label": 1}"#, "\n",
            ),
        );
        let samples = JsonlLoader::new(&path).load_all().unwrap();
        // Only the single well-formed binary-labelled line survives
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tweet, "c");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let loader = JsonlLoader::new("/definitely/not/here.jsonl");
        assert!(loader.load_all().is_err());
    }
}
