// ============================================================
// Layer 6 — Metrics
// ============================================================
// Two responsibilities:
//
//   1. compute() — pure, deterministic classification metrics
//      over full prediction arrays: accuracy, ROC-AUC (rank
//      based, ties get averaged ranks), macro-F1 and
//      positive-class F1.
//
//   2. MetricsLogger — appends one CSV row per epoch so
//      learning curves can be plotted after a run.
//
// ROC-AUC is undefined when the ground truth holds only one
// class; compute() reports that as an error instead of
// silently producing a wrong number.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};

// ─── Pure metric computation ──────────────────────────────────────────────────

/// Classification metrics over one full evaluation pass.
#[derive(Debug, Clone)]
pub struct Metrics {
    /// Fraction of exact label matches
    pub accuracy: f64,
    /// Ranking AUC between positive-class probabilities and labels
    pub auc: f64,
    /// Unweighted mean of per-class F1 scores
    pub f1_macro: f64,
    /// F1 restricted to the positive class (label = 1)
    pub f1_positive: f64,
}

/// Compute all metrics from equal-length arrays of ground-truth
/// labels, predicted labels, and positive-class probabilities.
pub fn compute(gt: &[i64], preds: &[i64], probs: &[f64]) -> Result<Metrics> {
    if gt.is_empty() {
        bail!("Cannot compute metrics over an empty evaluation set");
    }
    if gt.len() != preds.len() || gt.len() != probs.len() {
        bail!(
            "Metric input length mismatch: {} labels, {} predictions, {} probabilities",
            gt.len(),
            preds.len(),
            probs.len()
        );
    }

    let n_pos = gt.iter().filter(|&&g| g == 1).count();
    if n_pos == 0 || n_pos == gt.len() {
        bail!("ROC-AUC is undefined: ground truth contains only one class");
    }

    let correct = gt.iter().zip(preds).filter(|(g, p)| g == p).count();
    let accuracy = correct as f64 / gt.len() as f64;

    let auc = roc_auc(gt, probs);

    let f1_negative = f1_for_class(gt, preds, 0);
    let f1_positive = f1_for_class(gt, preds, 1);
    let f1_macro = (f1_negative + f1_positive) / 2.0;

    Ok(Metrics { accuracy, auc, f1_macro, f1_positive })
}

/// Rank-based ROC-AUC (Mann-Whitney U statistic).
///
/// Tied probabilities share the average of the ranks they span,
/// matching the standard definition.
fn roc_auc(gt: &[i64], probs: &[f64]) -> f64 {
    let n = gt.len();

    let mut idx: Vec<usize> = (0..n).collect();
    idx.sort_by(|&a, &b| probs[a].partial_cmp(&probs[b]).unwrap_or(Ordering::Equal));

    // Average ranks over runs of equal probabilities (1-based)
    let mut ranks = vec![0.0f64; n];
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && probs[idx[j + 1]] == probs[idx[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for k in i..=j {
            ranks[idx[k]] = avg_rank;
        }
        i = j + 1;
    }

    let n_pos = gt.iter().filter(|&&g| g == 1).count() as f64;
    let n_neg = n as f64 - n_pos;

    let rank_sum_pos: f64 = (0..n).filter(|&k| gt[k] == 1).map(|k| ranks[k]).sum();

    (rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg)
}

/// F1 score for a single class. Zero when the class is never
/// predicted and never present (no precision/recall defined).
fn f1_for_class(gt: &[i64], preds: &[i64], class: i64) -> f64 {
    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut fng = 0usize;

    for (&g, &p) in gt.iter().zip(preds) {
        match (g == class, p == class) {
            (true, true)  => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fng += 1,
            (false, false) => {}
        }
    }

    if tp == 0 {
        return 0.0;
    }
    let precision = tp as f64 / (tp + fp) as f64;
    let recall    = tp as f64 / (tp + fng) as f64;
    2.0 * precision * recall / (precision + recall)
}

// ─── CSV logger ───────────────────────────────────────────────────────────────

/// One row of validation metrics for a single training epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochMetrics {
    pub epoch:       usize,
    pub val_loss:    f64,
    pub accuracy:    f64,
    pub auc:         f64,
    pub f1_macro:    f64,
    pub f1_positive: f64,
}

impl EpochMetrics {
    /// Returns true if this epoch improved over the previous best val_loss
    pub fn is_improvement(&self, best_val_loss: f64) -> bool {
        self.val_loss < best_val_loss
    }
}

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Create a new MetricsLogger.
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<String>) -> Result<Self> {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("metrics.csv");

        // Header only for a fresh file so reruns append
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "epoch,val_loss,accuracy,auc,f1_macro,f1_positive")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            m.epoch, m.val_loss, m.accuracy, m.auc, m.f1_macro, m.f1_positive,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: val_loss={:.4}, auc={:.4}",
            m.epoch,
            m.val_loss,
            m.auc,
        );

        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
