// ============================================================
// Layer 4 — Text-Pair Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec<TweetSample>
// into one batch the fusion model can consume.
//
// Unlike a typical batcher, the text here stays as raw strings:
// the model tokenizes each modality itself, padded to the
// batch's own max length (see ml/encoder.rs). Only the labels
// become a tensor at this stage.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::domain::sample::TweetSample;

// ─── TextPairBatch ────────────────────────────────────────────────────────────
/// A batch of (tweet, image description) pairs plus labels.
/// The two string vectors always have the same length.
#[derive(Debug, Clone)]
pub struct TextPairBatch<B: Backend> {
    /// Raw image-description texts, one per sample
    pub image_descriptions: Vec<String>,

    /// Raw tweet texts, one per sample
    pub tweets: Vec<String>,

    /// Ground-truth labels — shape: [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

impl<B: Backend> TextPairBatch<B> {
    pub fn size(&self) -> usize {
        self.tweets.len()
    }
}

// ─── TextPairBatcher ──────────────────────────────────────────────────────────
/// Holds the target device so the label tensor is created where
/// the model lives.
#[derive(Clone, Debug)]
pub struct TextPairBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TextPairBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }
}

impl<B: Backend> Batcher<TweetSample, TextPairBatch<B>> for TextPairBatcher<B> {
    fn batch(&self, items: Vec<TweetSample>) -> TextPairBatch<B> {
        let image_descriptions: Vec<String> = items
            .iter()
            .map(|s| s.image_description.clone())
            .collect();

        let tweets: Vec<String> = items
            .iter()
            .map(|s| s.tweet.clone())
            .collect();

        let labels_flat: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let labels = Tensor::<B, 1, Int>::from_ints(
            labels_flat.as_slice(), &self.device,
        );

        TextPairBatch { image_descriptions, tweets, labels }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes_and_order() {
        let device = Default::default();
        let batcher = TextPairBatcher::<NdArray>::new(device);

        let items = vec![
            TweetSample::new("first tweet", "a dog", 0),
            TweetSample::new("second tweet", "a cat", 1),
            TweetSample::new("third tweet", "a bird", 1),
        ];

        let batch = batcher.batch(items);

        assert_eq!(batch.size(), 3);
        assert_eq!(batch.tweets[1], "second tweet");
        assert_eq!(batch.image_descriptions[2], "a bird");
        assert_eq!(batch.labels.dims(), [3]);

        let labels: Vec<i64> = batch.labels.into_data().convert::<i64>().value;
        assert_eq!(labels, vec![0, 1, 1]);
    }
}
