// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from a JSONL file on disk
// all the way to string batches the model can consume.
//
// The pipeline flows in this order:
//
//   data.jsonl
//       │
//       ▼
//   JsonlLoader       → parses one TweetSample per line
//       │
//       ▼
//   Preprocessor      → cleans tweet / description text
//       │
//       ▼
//   split_train_val   → shuffled train/validation split
//       │
//       ▼
//   TweetDataset      → implements Burn's Dataset trait,
//                       exposes class weights for the loss
//       │
//       ▼
//   TextPairBatcher   → groups samples into string batches
//                       plus a label tensor
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Tokenization is deliberately NOT part of this layer: the
// model tokenizes each batch itself, padded to that batch's
// own max length (see ml/encoder.rs).

/// Loads TweetSamples from a JSON-lines file
pub mod loader;

/// Cleans and normalises raw tweet text
pub mod preprocessor;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

/// Implements Burn's Dataset trait and class weighting
pub mod dataset;

/// Implements Burn's Batcher trait for string-pair batches
pub mod batcher;
