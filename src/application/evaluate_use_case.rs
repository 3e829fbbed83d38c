// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Explicit post-training evaluation of a trained fusion head
// against any JSONL file (typically the held-out test set).
// This is a separate command rather than an implicit tail of
// training, so a test-set number is only ever produced on
// purpose.
//
// Steps:
//   1. Reload the training config from the checkpoint directory
//   2. Rebuild tokenizer + frozen encoder from the pretrained dir
//   3. Rebuild the fusion head and load the latest weights
//   4. Load, clean, and batch the evaluation samples
//   5. Run the evaluation loop and print the summary

use anyhow::Result;
use burn::data::dataloader::DataLoaderBuilder;

use crate::data::{
    batcher::TextPairBatcher,
    dataset::{TweetDataset, NUM_CLASSES},
    loader::JsonlLoader,
    preprocessor::Preprocessor,
};
use crate::domain::sample::TweetSample;
use crate::domain::traits::SampleSource;
use crate::infra::{checkpoint::CheckpointManager, pretrained::PretrainedStore};
use crate::ml::evaluator::{evaluate, EvalReport};
use crate::ml::model::{FusionClassifier, FusionHeadConfig};

// Evaluation needs no gradients, so the plain backend is enough.
type EvalBackend = burn::backend::Wgpu;

pub struct EvaluateUseCase {
    data_file:      String,
    checkpoint_dir: String,
}

impl EvaluateUseCase {
    pub fn new(data_file: String, checkpoint_dir: String) -> Self {
        Self { data_file, checkpoint_dir }
    }

    /// Run one full evaluation pass and return the report.
    pub fn execute(&self) -> Result<EvalReport> {
        // ── Step 1: Reload the training config ────────────────────────────────
        let ckpt = CheckpointManager::new(&self.checkpoint_dir);
        let cfg = ckpt.load_config()?;

        let device = burn::backend::wgpu::WgpuDevice::default();
        tracing::info!("Using WGPU device: {:?}", device);

        // ── Step 2: Rebuild tokenizer + frozen encoder ────────────────────────
        let store = PretrainedStore::new(&cfg.encoder_dir);
        let tokenizer   = store.load_tokenizer()?;
        let encoder_cfg = store.load_encoder_config()?;
        let encoder     = store.load_encoder::<EvalBackend>(&encoder_cfg, &device)?;

        // ── Step 3: Rebuild the head and load trained weights ─────────────────
        let head = FusionHeadConfig::new(
            encoder_cfg.d_model, cfg.num_heads, cfg.dropout, NUM_CLASSES,
        )
        .init::<EvalBackend>(&device);
        let head = ckpt.load_head(head, &device)?;

        let classifier = FusionClassifier {
            tokenizer,
            encoder,
            head,
            max_seq_len: cfg.max_seq_len.min(encoder_cfg.max_seq_len),
            device: device.clone(),
        };

        // ── Step 4: Load and batch the evaluation samples ─────────────────────
        tracing::info!("Loading evaluation samples from '{}'", self.data_file);
        let prep = Preprocessor::new();
        let samples: Vec<TweetSample> = JsonlLoader::new(&self.data_file)
            .load_all()?
            .into_iter()
            .map(|s| TweetSample {
                tweet:             prep.clean(&s.tweet),
                image_description: prep.clean(&s.image_description),
                label:             s.label,
            })
            .collect();
        if samples.is_empty() {
            anyhow::bail!("No usable samples in '{}'", self.data_file);
        }

        let dataset = TweetDataset::new(samples);
        let class_weights = dataset.class_weights();
        let loader = DataLoaderBuilder::new(TextPairBatcher::<EvalBackend>::new(device))
            .batch_size(cfg.batch_size)
            .num_workers(1)
            .build(dataset);

        // ── Step 5: Evaluate ──────────────────────────────────────────────────
        evaluate(&classifier, loader.as_ref(), class_weights)
    }
}
