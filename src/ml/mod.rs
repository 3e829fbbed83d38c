// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// and the thin data/infra adapters around it.
//
// What's in this layer:
//
//   encoder.rs   — The shared frozen text encoder
//                  Token + position embeddings, stacked
//                  self-attention blocks, mean-pooling of the
//                  last hidden state. Both modalities go
//                  through this one encoder; its parameters
//                  never receive gradient updates.
//
//   model.rs     — The fusion head and classifier
//                  Cross-attention (image description as query,
//                  tweet as key/value), residual + layer norm,
//                  feed-forward block, 2-way projection.
//
//   trainer.rs   — The training loop
//                  Class-weighted cross-entropy, Adam with
//                  weight decay over the fusion head only,
//                  per-epoch validation and checkpointing.
//
//   evaluator.rs — The evaluation loop
//                  One pass over a loader in inference mode,
//                  per-example mean loss, accuracy / ROC-AUC /
//                  macro-F1 / positive-F1, printed summary.
//
// Reference: Vaswani et al. (2017) Attention Is All You Need

/// Frozen text encoder with batch tokenization and mean-pooling
pub mod encoder;

/// Cross-attention fusion head and the full classifier
pub mod model;

/// Training loop with per-epoch validation and checkpointing
pub mod trainer;

/// Standalone evaluation loop and metrics reporting
pub mod evaluator;
