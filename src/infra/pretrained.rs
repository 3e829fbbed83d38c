// ============================================================
// Layer 6 — Pretrained Asset Store
// ============================================================
// Resolves the "pretrained checkpoint identifier" — a directory
// expected to contain the shared encoder's assets:
//
//   <encoder_dir>/
//     tokenizer.json        ← HuggingFace tokenizer file
//     encoder_config.json   ← TextEncoderConfig (Burn Config)
//     encoder.mpk.gz        ← encoder weights (CompactRecorder)
//
// Nothing is validated beyond existence. Every missing asset has
// a fallback so the pipeline still runs end-to-end without
// downloaded weights:
//   - tokenizer: a word-level vocabulary built from the training
//     corpus, saved back into the directory
//   - config: small defaults, logged as a warning
//   - weights: random initialisation, logged as a warning
//
// In tokenizers 0.15, train_from_files requires Trainer::Model
// to equal ModelWrapper, so the fallback writes a valid
// tokenizer JSON by hand and loads it back, bypassing the
// trainer type mismatch entirely.

use anyhow::{Context, Result};
use std::{collections::HashMap, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use tokenizers::Tokenizer;

use crate::ml::encoder::{TextEncoder, TextEncoderConfig};

pub struct PretrainedStore {
    dir: PathBuf,
}

impl PretrainedStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self { dir: PathBuf::from(dir.into()) }
    }

    // ── Tokenizer ─────────────────────────────────────────────────────────────

    /// Load the pretrained tokenizer, or build a word-level
    /// fallback from `texts` and save it for later runs.
    pub fn load_or_build(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        let tok_path = self.dir.join("tokenizer.json");
        if tok_path.exists() {
            tracing::info!("Loading tokenizer from '{}'", tok_path.display());
            self.load_tokenizer()
        } else {
            tracing::warn!(
                "No tokenizer.json in '{}' — building word-level fallback (vocab_size={})",
                self.dir.display(),
                vocab_size
            );
            self.build_and_save(texts, vocab_size)
        }
    }

    /// Load a previously saved tokenizer. Errors when the file is
    /// missing — used by `evaluate`, which must reuse the exact
    /// vocabulary training saw.
    pub fn load_tokenizer(&self) -> Result<Tokenizer> {
        let path = self.dir.join("tokenizer.json");
        Tokenizer::from_file(&path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", path.display(), e
            ))
    }

    fn build_and_save(&self, texts: &[String], vocab_size: usize) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: Rank words by corpus frequency ────────────────────────────
        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1));
        // Regular ids are handed out from 104 upward (after the
        // BERT-convention special ids), so the word budget is the
        // id space above that. Every emitted id must stay below
        // vocab_size or it would index past the embedding table.
        words.truncate(vocab_size.saturating_sub(104));

        // ── Step 2: Build the vocab map ───────────────────────────────────────
        // Special tokens keep the BERT-convention ids
        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  101,
            "[SEP]":  102,
            "[MASK]": 103,
        });

        let mut next_id = 104usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        // ── Step 3: Write tokenizer JSON in HuggingFace format ────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0,   "content": "[PAD]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1,   "content": "[UNK]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 101, "content": "[CLS]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 102, "content": "[SEP]",  "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 103, "content": "[MASK]", "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": "[UNK]"
            }
        });

        let tok_path = self.dir.join("tokenizer.json");
        std::fs::write(
            &tok_path,
            serde_json::to_string_pretty(&tokenizer_json)?,
        ).with_context(|| "Cannot write tokenizer JSON")?;

        tracing::info!(
            "Fallback tokenizer built ({} entries), saved to '{}'",
            next_id,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }

    // ── Encoder ───────────────────────────────────────────────────────────────

    /// Load the encoder architecture config, falling back to small
    /// defaults when the directory carries none.
    pub fn load_encoder_config(&self) -> Result<TextEncoderConfig> {
        let path = self.dir.join("encoder_config.json");
        if path.exists() {
            TextEncoderConfig::load(&path).map_err(|e| {
                anyhow::anyhow!("Cannot load encoder config '{}': {}", path.display(), e)
            })
        } else {
            tracing::warn!(
                "No encoder_config.json in '{}' — using default encoder architecture",
                self.dir.display()
            );
            // 768-wide encoder matching the pooled embedding width
            // the fusion head expects by default
            Ok(TextEncoderConfig::new(30522, 128, 768, 12, 4, 3072))
        }
    }

    /// Build the encoder and load its pretrained weights when
    /// present. A missing weights file degrades to random
    /// initialisation with a warning — the identifier is not
    /// validated locally.
    pub fn load_encoder<B: Backend>(
        &self,
        cfg:    &TextEncoderConfig,
        device: &B::Device,
    ) -> Result<TextEncoder<B>> {
        let encoder = cfg.init::<B>(device);

        let weights_path = self.dir.join("encoder");
        if self.dir.join("encoder.mpk.gz").exists() {
            tracing::info!("Loading pretrained encoder weights from '{}'", self.dir.display());
            let record = CompactRecorder::new()
                .load(weights_path.clone(), device)
                .with_context(|| {
                    format!("Cannot load encoder weights '{}'", weights_path.display())
                })?;
            Ok(encoder.load_record(record))
        } else {
            tracing::warn!(
                "No encoder weights in '{}' — encoder is randomly initialised",
                self.dir.display()
            );
            Ok(encoder)
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PretrainedStore {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        PretrainedStore::new(dir.to_string_lossy().into_owned())
    }

    #[test]
    fn test_fallback_tokenizer_round_trips_words() {
        let store = temp_store("tweet_fusion_pretrained_tok");
        let texts = vec![
            "the cat sat on the mat".to_string(),
            "the dog ran in the park".to_string(),
        ];

        let tokenizer = store.load_or_build(&texts, 64).unwrap();
        let enc = tokenizer.encode("the cat ran", true).unwrap();
        // Known words map above the special-token range
        assert!(enc.get_ids().iter().all(|&id| id == 1 || id >= 104 || id == 0));
        assert!(!enc.get_ids().is_empty());
    }

    #[test]
    fn test_second_load_reuses_saved_tokenizer() {
        let store = temp_store("tweet_fusion_pretrained_reuse");
        let texts = vec!["alpha beta gamma".to_string()];

        let first = store.load_or_build(&texts, 64).unwrap();
        // Different corpus, but the saved file wins
        let second = store.load_or_build(&["other words".to_string()], 64).unwrap();

        let a = first.encode("alpha", true).unwrap();
        let b = second.encode("alpha", true).unwrap();
        assert_eq!(a.get_ids(), b.get_ids());
    }

    #[test]
    fn test_fallback_ids_stay_below_vocab_size() {
        let store = temp_store("tweet_fusion_pretrained_budget");
        let vocab_size = 150usize;

        // Far more unique words than the id budget allows
        let corpus: Vec<String> = (0..300).map(|i| format!("word{i}")).collect();
        let text = corpus.join(" ");

        let tokenizer = store.load_or_build(&[text.clone()], vocab_size).unwrap();
        let enc = tokenizer.encode(text.as_str(), true).unwrap();

        // No id may reach the embedding-table bound
        assert!(enc.get_ids().iter().all(|&id| (id as usize) < vocab_size));
        // The budget is actually spent on words, not collapsed to [UNK]
        assert!(enc.get_ids().iter().any(|&id| id >= 104));
    }

    #[test]
    fn test_missing_tokenizer_is_an_error_for_direct_load() {
        let store = temp_store("tweet_fusion_pretrained_missing");
        assert!(store.load_tokenizer().is_err());
    }

    #[test]
    fn test_default_encoder_config() {
        let store = temp_store("tweet_fusion_pretrained_cfg");
        let cfg = store.load_encoder_config().unwrap();
        assert_eq!(cfg.d_model, 768);
        assert!(!cfg.trainable);
    }
}
