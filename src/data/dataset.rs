// ============================================================
// Layer 4 — Tweet Dataset
// ============================================================
// Implements Burn's Dataset trait over TweetSamples and exposes
// the per-class loss weights the training loop needs.
//
// Class weighting: tweet datasets are usually imbalanced (far
// fewer positives than negatives). Each class's loss weight is
// inversely proportional to its frequency:
//
//   w_c = total / (num_classes * count_c)
//
// so a class holding half the samples gets weight 1.0, and a
// rarer class gets a proportionally larger weight.

use burn::data::dataset::Dataset;

use crate::domain::sample::TweetSample;

pub const NUM_CLASSES: usize = 2;

pub struct TweetDataset {
    samples: Vec<TweetSample>,
}

impl TweetDataset {
    pub fn new(samples: Vec<TweetSample>) -> Self {
        Self { samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Inverse-frequency loss weights, one per class.
    ///
    /// A class absent from the dataset has its count clamped to 1
    /// so the weight stays finite.
    pub fn class_weights(&self) -> Vec<f32> {
        let mut counts = [0usize; NUM_CLASSES];
        for s in &self.samples {
            if s.label < NUM_CLASSES {
                counts[s.label] += 1;
            }
        }

        let total = self.samples.len().max(1) as f32;
        counts
            .iter()
            .map(|&c| total / (NUM_CLASSES as f32 * c.max(1) as f32))
            .collect()
    }
}

impl Dataset<TweetSample> for TweetDataset {
    fn get(&self, index: usize) -> Option<TweetSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
