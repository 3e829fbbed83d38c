// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop using Burn's DataLoader and Adam.
//
// Key points:
//   - Training uses an AutodiffBackend for gradients; validation
//     runs on the inner backend via classifier.valid()
//   - The optimizer only ever steps the fusion head — the frozen
//     encoder is not part of any GradientsParams
//   - Fixed learning rate and weight decay for the whole run:
//     no schedule, no warmup, no clipping, no accumulation
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::Result;
use burn::{
    data::dataloader::DataLoaderBuilder,
    nn::loss::CrossEntropyLossConfig,
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use tokenizers::Tokenizer;

use crate::application::train_use_case::TrainConfig;
use crate::data::{batcher::TextPairBatcher, dataset::TweetDataset, dataset::NUM_CLASSES};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::infra::pretrained::PretrainedStore;
use crate::ml::encoder::TextEncoderConfig;
use crate::ml::evaluator::evaluate;
use crate::ml::model::{FusionClassifier, FusionHeadConfig};

type MyBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

pub fn run_training(
    cfg:           &TrainConfig,
    tokenizer:     Tokenizer,
    encoder_cfg:   TextEncoderConfig,
    train_dataset: TweetDataset,
    val_dataset:   TweetDataset,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    // Device is resolved once here and passed down explicitly —
    // construction below is side-effect free.
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<MyBackend>(
        cfg, tokenizer, encoder_cfg, train_dataset, val_dataset, ckpt_manager, device,
    )
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    tokenizer:     Tokenizer,
    encoder_cfg:   TextEncoderConfig,
    train_dataset: TweetDataset,
    val_dataset:   TweetDataset,
    ckpt_manager:  CheckpointManager,
    device:        B::Device,
) -> Result<()> {

    // ── Build classifier: frozen encoder + trainable head ────────────────────
    let store = PretrainedStore::new(&cfg.encoder_dir);
    let encoder = store.load_encoder::<B>(&encoder_cfg, &device)?;

    let head_cfg = FusionHeadConfig::new(
        encoder_cfg.d_model, cfg.num_heads, cfg.dropout, NUM_CLASSES,
    );
    let head = head_cfg.init::<B>(&device);

    // The position table bounds how long a sequence can get
    let max_seq_len = cfg.max_seq_len.min(encoder_cfg.max_seq_len);

    let mut classifier = FusionClassifier {
        tokenizer,
        encoder,
        head,
        max_seq_len,
        device: device.clone(),
    };

    tracing::info!(
        "Trainable params: {}/{} (fusion head only)",
        classifier.trainable_params(),
        classifier.total_params(),
    );

    // ── Class-weighted cross-entropy ──────────────────────────────────────────
    // Weights come from the training dataset's label distribution.
    let train_weights = train_dataset.class_weights();
    let val_weights   = val_dataset.class_weights();
    tracing::info!("Class weights: {:?}", train_weights);

    let criterion = CrossEntropyLossConfig::new()
        .with_weights(Some(train_weights))
        .init(&device);

    // ── Adam optimiser over the fusion head ───────────────────────────────────
    // m = β1*m + (1-β1)*g        (mean)
    // v = β2*v + (1-β2)*g²       (variance)
    // θ = θ - lr * m / (√v + ε)  (update)
    let optim_cfg = AdamConfig::new()
        .with_epsilon(1e-8)
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.weight_decay)));
    let mut optim = optim_cfg.init();

    // ── Training data loader (AutodiffBackend) ────────────────────────────────
    let train_batcher = TextPairBatcher::<B>::new(device.clone());
    let train_loader  = DataLoaderBuilder::new(train_batcher)
        .batch_size(cfg.batch_size)
        .shuffle(42)
        .num_workers(1)
        .build(train_dataset);

    // ── Validation data loader (InnerBackend — no autodiff overhead) ──────────
    let val_batcher = TextPairBatcher::<B::InnerBackend>::new(device.clone());
    let val_loader  = DataLoaderBuilder::new(val_batcher)
        .batch_size(cfg.batch_size)
        .num_workers(1)
        .build(val_dataset);

    let logger = MetricsLogger::new(&cfg.checkpoint_dir)?;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut best_val_loss = f64::INFINITY;

    for epoch in 1..=cfg.epochs {

        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let logits = classifier.forward(&batch.tweets, &batch.image_descriptions)?;
            let loss = criterion.forward(logits, batch.labels);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Backward pass + Adam update — the head is the only
            // module the optimizer sees, so encoder weights can
            // never move.
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &classifier.head);
            classifier.head = optim.step(cfg.lr, classifier.head.clone(), grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else { f64::NAN };

        // ── Validation phase ──────────────────────────────────────────────────
        // classifier.valid() → inner backend, dropout disabled
        println!("Epoch: {}/{} | train_loss={:.4}", epoch, cfg.epochs, avg_train_loss);

        let report = evaluate(&classifier.valid(), val_loader.as_ref(), val_weights.clone())?;

        let epoch_metrics = EpochMetrics {
            epoch,
            val_loss:    report.loss,
            accuracy:    report.accuracy,
            auc:         report.auc,
            f1_macro:    report.f1_macro,
            f1_positive: report.f1_positive,
        };

        if epoch_metrics.is_improvement(best_val_loss) {
            best_val_loss = epoch_metrics.val_loss;
            tracing::info!("New best val_loss={:.4} at epoch {}", best_val_loss, epoch);
        }

        logger.log(&epoch_metrics)?;

        ckpt_manager.save_head(&classifier.head, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);

        println!("{}", "-".repeat(25));
    }

    tracing::info!("Training complete!");
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::TweetSample;
    use burn::backend::{Autodiff, NdArray};

    type TestBackend = Autodiff<NdArray>;

    #[test]
    fn test_one_epoch_on_balanced_synthetic_data() {
        let work_dir = std::env::temp_dir().join("tweet_fusion_train_e2e");
        let ckpt_dir = work_dir.join("checkpoints");
        let enc_dir  = work_dir.join("encoder");

        let cfg = TrainConfig {
            train_file:     String::new(),
            valid_file:     None,
            valid_fraction: 0.0,
            checkpoint_dir: ckpt_dir.to_string_lossy().into_owned(),
            encoder_dir:    enc_dir.to_string_lossy().into_owned(),
            batch_size:     2,
            epochs:         1,
            lr:             0.05,
            weight_decay:   0.01,
            num_heads:      4,
            dropout:        0.5,
            max_seq_len:    16,
            vocab_size:     64,
        };

        // 4 examples, 2 per class — both train and validation see
        // both classes so AUC stays defined.
        let samples = vec![
            TweetSample::new("the dog runs fast", "a dog on grass", 0),
            TweetSample::new("a cat sleeps all day", "a cat on a sofa", 1),
            TweetSample::new("birds sing at dawn", "a bird on a branch", 0),
            TweetSample::new("fish swim in circles", "a fish in a tank", 1),
        ];
        let corpus: Vec<String> = samples
            .iter()
            .flat_map(|s| [s.tweet.clone(), s.image_description.clone()])
            .collect();

        let store = PretrainedStore::new(cfg.encoder_dir.clone());
        let tokenizer = store.load_or_build(&corpus, cfg.vocab_size).unwrap();
        let encoder_cfg = crate::ml::encoder::TextEncoderConfig::new(512, 16, 8, 2, 1, 16);

        let train_dataset = TweetDataset::new(samples.clone());
        let val_dataset   = TweetDataset::new(samples);
        let ckpt_manager  = CheckpointManager::new(cfg.checkpoint_dir.clone());

        let device = Default::default();
        let result = train_loop::<TestBackend>(
            &cfg, tokenizer, encoder_cfg, train_dataset, val_dataset, ckpt_manager, device,
        );

        assert!(result.is_ok(), "training failed: {:?}", result.err());
        assert!(ckpt_dir.join("latest_epoch.json").exists());
        assert!(ckpt_dir.join("metrics.csv").exists());
    }
}
