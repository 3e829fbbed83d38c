// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores the fusion-head weights using Burn's
// CompactRecorder. Only the head is checkpointed — the encoder
// is frozen pretrained state owned by the PretrainedStore.
//
// What gets saved per run:
//   1. Head weights (.mpk.gz per epoch) — the learned parameters
//   2. latest_epoch.json                — which epoch was last saved
//   3. train_config.json                — hyperparameters, so the
//      `evaluate` command can rebuild the exact same head
//
// File naming convention:
//   checkpoints/
//     head_epoch_1.mpk.gz
//     head_epoch_2.mpk.gz
//     ...
//     latest_epoch.json
//     train_config.json
//     metrics.csv

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::FusionHead;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager, creating the directory
    /// if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    /// Save the fusion-head weights for a given epoch and update
    /// the latest-epoch pointer.
    pub fn save_head<B: AutodiffBackend>(
        &self,
        head:  &FusionHead<B>,
        epoch: usize,
    ) -> Result<()> {
        // Recorder appends its own extension
        let path = self.dir.join(format!("head_epoch_{epoch}"));

        CompactRecorder::new()
            .record(head.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let latest_path = self.dir.join("latest_epoch.json");
        fs::write(&latest_path, serde_json::to_string(&epoch)?)
            .with_context(|| "Failed to write latest_epoch.json")?;

        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Load the fusion-head weights from the latest saved epoch.
    ///
    /// The head passed in must have the architecture the
    /// checkpoint was saved with, or loading fails.
    pub fn load_head<B: Backend>(
        &self,
        head:   FusionHead<B>,
        device: &B::Device,
    ) -> Result<FusionHead<B>> {
        let epoch = self.latest_epoch()?;
        let path  = self.dir.join(format!("head_epoch_{epoch}"));

        tracing::info!("Loading fusion head from epoch {}", epoch);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!(
                    "Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display()
                )
            })?;

        Ok(head.load_record(record))
    }

    /// Save the training configuration to JSON so `evaluate` can
    /// rebuild the same head architecture later.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.dir.join("train_config.json");
        let json = serde_json::to_string_pretty(cfg)?;

        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;

        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    /// Load the training configuration from JSON.
    pub fn load_config(&self) -> Result<TrainConfig> {
        let path = self.dir.join("train_config.json");

        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read config from '{}'. \
                     Make sure you have run 'train' before 'evaluate'.",
                    path.display()
                )
            })?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Read latest_epoch.json and return the epoch number.
    fn latest_epoch(&self) -> Result<usize> {
        let path = self.dir.join("latest_epoch.json");

        let s = fs::read_to_string(&path)
            .with_context(|| {
                "Cannot find 'latest_epoch.json'. Have you run 'train' first?"
            })?;

        Ok(serde_json::from_str::<usize>(&s)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let dir = std::env::temp_dir().join("tweet_fusion_ckpt_config");
        let mgr = CheckpointManager::new(dir.to_string_lossy().into_owned());

        let cfg = TrainConfig::default();
        mgr.save_config(&cfg).unwrap();

        let loaded = mgr.load_config().unwrap();
        assert_eq!(loaded.num_heads, cfg.num_heads);
        assert_eq!(loaded.epochs, cfg.epochs);
        assert!((loaded.lr - cfg.lr).abs() < 1e-12);
    }

    #[test]
    fn test_latest_epoch_missing_is_an_error() {
        let dir = std::env::temp_dir().join("tweet_fusion_ckpt_empty");
        let _ = fs::remove_dir_all(&dir);
        let mgr = CheckpointManager::new(dir.to_string_lossy().into_owned());
        assert!(mgr.latest_epoch().is_err());
    }
}
