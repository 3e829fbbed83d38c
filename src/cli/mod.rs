// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains the fusion head on labelled pairs
//   2. `evaluate` — scores a trained head against a JSONL file

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "tweet-fusion",
    version = "0.1.0",
    about = "Train a cross-attention fusion classifier on tweet / image-description pairs."
)]
pub struct Cli {
    /// The subcommand to run (train or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    ///
    /// The match moves the args payload out of `self`, so the
    /// handlers are associated functions rather than methods —
    /// they never needed the rest of the struct anyway.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => Self::run_train(args),
            Commands::Evaluate(args) => Self::run_evaluate(args),
        }
    }

    fn run_train(args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on '{}'", args.train_file);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    fn run_evaluate(args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(
            args.data_file,
            args.checkpoint_dir,
        );

        // The evaluator prints the summary line itself
        let report = use_case.execute()?;
        tracing::info!("Evaluation finished: auc={:.4}", report.auc);
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_train_subcommand() {
        let cli = Cli::try_parse_from([
            "tweet-fusion", "train", "--train-file", "data/x.jsonl", "--epochs", "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Train(args) => {
                assert_eq!(args.train_file, "data/x.jsonl");
                assert_eq!(args.epochs, 3);
                // Untouched flags keep their defaults
                assert_eq!(args.num_heads, 4);
            }
            _ => panic!("expected the train subcommand"),
        }
    }

    #[test]
    fn test_parses_evaluate_subcommand_and_moves_args_out() {
        let cli = Cli::try_parse_from([
            "tweet-fusion", "evaluate", "--data-file", "test.jsonl",
        ])
        .unwrap();

        // Same by-value destructure run() performs on dispatch
        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.data_file, "test.jsonl");
                assert_eq!(args.checkpoint_dir, "checkpoints");
            }
            _ => panic!("expected the evaluate subcommand"),
        }
    }

    #[test]
    fn test_missing_required_flag_is_an_error() {
        // `evaluate` has no default for --data-file
        assert!(Cli::try_parse_from(["tweet-fusion", "evaluate"]).is_err());
    }
}
