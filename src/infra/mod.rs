// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns that don't belong in any specific
// business layer:
//
//   metrics.rs    — Pure metric computation (accuracy, ROC-AUC,
//                   macro-F1, positive-class F1) plus a CSV
//                   logger for per-epoch validation metrics.
//
//   checkpoint.rs — Saving and loading the fusion-head weights
//                   via Burn's CompactRecorder, the latest-epoch
//                   pointer, and the training config JSON.
//
//   pretrained.rs — The pretrained encoder assets: tokenizer
//                   JSON, encoder config, and encoder weights,
//                   loaded from a named directory with sensible
//                   fallbacks when assets are missing.

/// Metric computation and the per-epoch CSV logger
pub mod metrics;

/// Fusion-head checkpoint saving and loading
pub mod checkpoint;

/// Pretrained tokenizer and encoder asset store
pub mod pretrained;
