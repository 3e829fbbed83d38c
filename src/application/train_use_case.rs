// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load the JSONL dataset        (Layer 4 - data)
//   Step 2: Clean the text                (Layer 4 - data)
//   Step 3: Split train/validation        (Layer 4 - data)
//   Step 4: Load tokenizer + encoder cfg  (Layer 6 - infra)
//   Step 5: Build datasets                (Layer 4 - data)
//   Step 6: Save config                   (Layer 6 - infra)
//   Step 7: Run training loop             (Layer 5 - ml)

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::data::{
    loader::JsonlLoader,
    preprocessor::Preprocessor,
    dataset::TweetDataset,
    splitter::split_train_val,
};
use crate::domain::sample::TweetSample;
use crate::domain::traits::SampleSource;
use crate::infra::{checkpoint::CheckpointManager, pretrained::PretrainedStore};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run. Serialisable so it can
// be saved to disk and reloaded by the `evaluate` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub train_file:     String,
    pub valid_file:     Option<String>,
    pub valid_fraction: f64,
    pub checkpoint_dir: String,
    pub encoder_dir:    String,
    pub batch_size:     usize,
    pub epochs:         usize,
    pub lr:             f64,
    pub weight_decay:   f64,
    pub num_heads:      usize,
    pub dropout:        f64,
    pub max_seq_len:    usize,
    pub vocab_size:     usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            train_file:     "data/train.jsonl".to_string(),
            valid_file:     None,
            valid_fraction: 0.1,
            checkpoint_dir: "checkpoints".to_string(),
            encoder_dir:    "pretrained/encoder-base".to_string(),
            batch_size:     8,
            epochs:         10,
            lr:             0.5,
            weight_decay:   0.01,
            num_heads:      4,
            dropout:        0.5,
            max_seq_len:    128,
            vocab_size:     30522,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // ── Step 1: Load labelled samples ─────────────────────────────────────
        tracing::info!("Loading training samples from '{}'", cfg.train_file);
        let raw_samples = JsonlLoader::new(&cfg.train_file).load_all()?;
        if raw_samples.is_empty() {
            anyhow::bail!("No usable samples in '{}'", cfg.train_file);
        }

        // ── Step 2: Clean tweet and description text ──────────────────────────
        let prep = Preprocessor::new();
        let samples = clean_samples(&prep, raw_samples);

        // ── Step 3: Train/validation split ────────────────────────────────────
        // An explicit validation file wins; otherwise carve a
        // fraction off the shuffled training set.
        let (train_samples, val_samples) = match &cfg.valid_file {
            Some(valid_file) => {
                tracing::info!("Loading validation samples from '{}'", valid_file);
                let val = clean_samples(&prep, JsonlLoader::new(valid_file).load_all()?);
                (samples, val)
            }
            None => split_train_val(samples, 1.0 - cfg.valid_fraction),
        };
        tracing::info!(
            "Split: {} train, {} validation",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 4: Resolve pretrained assets ─────────────────────────────────
        // Tokenizer and encoder architecture come from the named
        // pretrained directory; the fallback tokenizer is built
        // from the training corpus.
        let store = PretrainedStore::new(&cfg.encoder_dir);
        let corpus: Vec<String> = train_samples
            .iter()
            .flat_map(|s| [s.tweet.clone(), s.image_description.clone()])
            .collect();
        let tokenizer   = store.load_or_build(&corpus, cfg.vocab_size)?;
        let encoder_cfg = store.load_encoder_config()?;

        // ── Step 5: Build Burn datasets ───────────────────────────────────────
        let train_dataset = TweetDataset::new(train_samples);
        let val_dataset   = TweetDataset::new(val_samples);

        // ── Step 6: Save config for the evaluate command ──────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;

        // ── Step 7: Run training loop (Layer 5) ───────────────────────────────
        run_training(cfg, tokenizer, encoder_cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}

fn clean_samples(prep: &Preprocessor, samples: Vec<TweetSample>) -> Vec<TweetSample> {
    samples
        .into_iter()
        .map(|s| TweetSample {
            tweet:             prep.clean(&s.tweet),
            image_description: prep.clean(&s.image_description),
            label:             s.label,
        })
        .collect()
}
