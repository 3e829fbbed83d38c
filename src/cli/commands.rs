// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `train` and `evaluate`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the fusion classifier on labelled tweet/image pairs
    Train(TrainArgs),

    /// Evaluate a trained checkpoint against a JSONL file
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// JSONL file with {"tweet", "image_description", "label"} objects
    #[arg(long, default_value = "data/train.jsonl")]
    pub train_file: String,

    /// Optional separate validation JSONL file.
    /// When absent, --valid-fraction is carved off the training set.
    #[arg(long)]
    pub valid_file: Option<String>,

    /// Fraction of the training set held out for validation
    /// when no --valid-file is given
    #[arg(long, default_value_t = 0.1)]
    pub valid_fraction: f64,

    /// Directory to save fusion-head checkpoints and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Pretrained encoder directory: tokenizer.json,
    /// encoder_config.json, encoder.mpk.gz
    #[arg(long, default_value = "pretrained/encoder-base")]
    pub encoder_dir: String,

    /// Number of samples processed together in one forward pass
    #[arg(long, default_value_t = 8)]
    pub batch_size: usize,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Learning rate, fixed for the whole run (no schedule)
    #[arg(long, default_value_t = 0.5)]
    pub lr: f64,

    /// L2 weight decay applied by the Adam optimiser
    #[arg(long, default_value_t = 0.01)]
    pub weight_decay: f64,

    /// Number of heads in the cross-attention block
    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    /// Dropout on the cross-attention weights during training
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Maximum number of tokens kept per text
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Vocabulary budget for the fallback tokenizer when the
    /// pretrained directory has no tokenizer.json
    #[arg(long, default_value_t = 30522)]
    pub vocab_size: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            train_file:     a.train_file,
            valid_file:     a.valid_file,
            valid_fraction: a.valid_fraction,
            checkpoint_dir: a.checkpoint_dir,
            encoder_dir:    a.encoder_dir,
            batch_size:     a.batch_size,
            epochs:         a.epochs,
            lr:             a.lr,
            weight_decay:   a.weight_decay,
            num_heads:      a.num_heads,
            dropout:        a.dropout,
            max_seq_len:    a.max_seq_len,
            vocab_size:     a.vocab_size,
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// JSONL file to evaluate (e.g. the held-out test set)
    #[arg(long)]
    pub data_file: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
