// ============================================================
// Layer 5 — Evaluation Loop
// ============================================================
// Runs the classifier in inference mode over a data loader
// exactly once, accumulating:
//   - summed per-batch losses (weighted cross-entropy)
//   - argmax predictions
//   - softmax positive-class probabilities
//
// The reported loss is the summed batch losses divided by the
// total example count, so it is a per-example mean rather than
// a per-batch mean.
//
// AUC is part of the printed summary line and the returned
// report, same as the other metrics.
//
// Callers hand in a classifier on a non-autodiff backend
// (model.valid() during training), so no gradients are tracked
// and dropout is disabled.

use anyhow::Result;
use burn::{
    data::dataloader::DataLoader,
    nn::loss::CrossEntropyLossConfig,
    prelude::*,
    tensor::activation::softmax,
};

use crate::data::batcher::TextPairBatch;
use crate::infra::metrics;
use crate::ml::model::FusionClassifier;

/// Everything one evaluation pass produces.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Mean per-example weighted cross-entropy loss
    pub loss: f64,
    pub accuracy: f64,
    pub auc: f64,
    pub f1_macro: f64,
    pub f1_positive: f64,
}

impl EvalReport {
    pub fn summary(&self) -> String {
        format!(
            "Average loss: {:.4} | accuracy: {:.3} | auc: {:.3} | f1_macro: {:.3} | f1_pos: {:.3}",
            self.loss, self.accuracy, self.auc, self.f1_macro, self.f1_positive,
        )
    }
}

/// Evaluate the classifier over every batch in the loader.
///
/// `class_weights` comes from the evaluated dataset itself so the
/// reported loss is weighted the same way the training loss is.
pub fn evaluate<B: Backend>(
    classifier:    &FusionClassifier<B>,
    loader:        &dyn DataLoader<TextPairBatch<B>>,
    class_weights: Vec<f32>,
) -> Result<EvalReport> {
    let ce = CrossEntropyLossConfig::new()
        .with_weights(Some(class_weights))
        .init(&classifier.device);

    let mut loss_sum = 0.0f64;
    let mut example_count = 0usize;
    let mut gt:    Vec<i64> = Vec::new();
    let mut preds: Vec<i64> = Vec::new();
    let mut probs: Vec<f64> = Vec::new();

    for batch in loader.iter() {
        let logits = classifier.forward(&batch.tweets, &batch.image_descriptions)?;
        let [batch_size, _] = logits.dims();

        let loss = ce.forward(logits.clone(), batch.labels.clone());
        loss_sum += loss.into_scalar().elem::<f64>();
        example_count += batch_size;

        // argmax(1) returns [batch, 1] — flatten before collecting
        let batch_preds: Vec<i64> = logits
            .clone()
            .argmax(1)
            .flatten::<1>(0, 1)
            .into_data()
            .convert::<i64>()
            .value;

        // Positive-class likelihood: softmax column 1
        let batch_probs: Vec<f64> = softmax(logits, 1)
            .slice([0..batch_size, 1..2])
            .reshape([batch_size])
            .into_data()
            .convert::<f64>()
            .value;

        let batch_gt: Vec<i64> = batch
            .labels
            .into_data()
            .convert::<i64>()
            .value;

        preds.extend(batch_preds);
        probs.extend(batch_probs);
        gt.extend(batch_gt);
    }

    let loss = per_example_mean(loss_sum, example_count);
    let m = metrics::compute(&gt, &preds, &probs)?;

    let report = EvalReport {
        loss,
        accuracy:    m.accuracy,
        auc:         m.auc,
        f1_macro:    m.f1_macro,
        f1_positive: m.f1_positive,
    };

    println!("{}", report.summary());
    Ok(report)
}

/// Summed batch losses / total example count (NOT batch count).
fn per_example_mean(loss_sum: f64, example_count: usize) -> f64 {
    if example_count == 0 {
        f64::NAN
    } else {
        loss_sum / example_count as f64
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batcher::TextPairBatcher;
    use crate::data::dataset::TweetDataset;
    use crate::domain::sample::TweetSample;
    use crate::infra::pretrained::PretrainedStore;
    use crate::ml::encoder::TextEncoderConfig;
    use crate::ml::model::FusionHeadConfig;
    use burn::backend::NdArray;
    use burn::data::dataloader::DataLoaderBuilder;

    #[test]
    fn test_per_example_mean_uses_example_count() {
        // Two batches of summed loss 2.0 + 4.0 over 4 examples → 1.5
        assert!((per_example_mean(6.0, 4) - 1.5).abs() < 1e-9);
        assert!(per_example_mean(1.0, 0).is_nan());
    }

    #[test]
    fn test_full_pass_over_synthetic_loader() {
        let device = Default::default();
        let dir = std::env::temp_dir().join("tweet_fusion_eval_pass");

        let samples = vec![
            TweetSample::new("the dog runs fast", "a dog on grass", 0),
            TweetSample::new("a cat sleeps all day", "a cat on a sofa", 1),
            TweetSample::new("birds sing at dawn", "a bird on a branch", 0),
            TweetSample::new("fish swim in circles", "a fish in a tank", 1),
        ];
        let corpus: Vec<String> = samples.iter().map(|s| s.tweet.clone()).collect();

        let tokenizer = PretrainedStore::new(dir.to_string_lossy().into_owned())
            .load_or_build(&corpus, 64)
            .unwrap();
        let encoder = TextEncoderConfig::new(512, 16, 8, 2, 1, 16).init(&device);
        let head = FusionHeadConfig::new(8, 4, 0.5, 2).init(&device);
        let classifier = FusionClassifier::<NdArray> {
            tokenizer,
            encoder,
            head,
            max_seq_len: 16,
            device,
        };

        let dataset = TweetDataset::new(samples);
        let weights = dataset.class_weights();
        let loader = DataLoaderBuilder::new(TextPairBatcher::<NdArray>::new(
            classifier.device.clone(),
        ))
        .batch_size(3)
        .build(dataset);

        let report = evaluate(&classifier, loader.as_ref(), weights).unwrap();

        assert!(report.loss.is_finite());
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert!((0.0..=1.0).contains(&report.auc));
        assert!((0.0..=1.0).contains(&report.f1_macro));
    }
}
