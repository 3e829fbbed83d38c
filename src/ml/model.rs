// ============================================================
// Layer 5 — Fusion Model
// ============================================================
// The trainable part of the system: a cross-attention fusion
// head on top of the frozen text encoder.
//
// Forward pass for one batch of (tweet, image description):
//
//   tweet ids  ─► encoder ─► mean-pool ─► tweet_emb  [batch, d]
//   image ids  ─► encoder ─► mean-pool ─► image_emb  [batch, d]
//
//   attn  = CrossAttention(query = image_emb,
//                          key = value = tweet_emb)
//   fused = LayerNorm(attn + tweet_emb)
//   h     = ReLU(Linear1(fused))
//   h     = LayerNorm(h + fused)
//   logits = Linear2(h)                               [batch, 2]
//
// Only the head's parameters (attention, two layer norms, two
// linears) receive gradient updates; the encoder is frozen at
// construction (see encoder.rs).

use anyhow::Result;
use burn::{
    module::AutodiffModule,
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use tokenizers::Tokenizer;

use crate::ml::encoder::{encode_padded, TextEncoder};

#[derive(Config, Debug)]
pub struct FusionHeadConfig {
    pub d_model:     usize,
    pub num_heads:   usize,
    pub dropout:     f64,
    pub num_classes: usize,
}

impl FusionHeadConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> FusionHead<B> {
        // Dropout here applies to the attention weights during training
        let cross_attn = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let attn_norm = LayerNormConfig::new(self.d_model).init(device);
        let linear1   = LinearConfig::new(self.d_model, self.d_model).init(device);
        let mlp_norm  = LayerNormConfig::new(self.d_model).init(device);
        let linear2   = LinearConfig::new(self.d_model, self.num_classes).init(device);

        FusionHead { cross_attn, attn_norm, linear1, mlp_norm, linear2 }
    }
}

#[derive(Module, Debug)]
pub struct FusionHead<B: Backend> {
    pub cross_attn: MultiHeadAttention<B>,
    pub attn_norm:  LayerNorm<B>,
    pub linear1:    Linear<B>,
    pub mlp_norm:   LayerNorm<B>,
    pub linear2:    Linear<B>,
}

impl<B: Backend> FusionHead<B> {
    /// tweet_emb, image_emb: [batch, d_model] → logits [batch, num_classes]
    pub fn forward(&self, tweet_emb: Tensor<B, 2>, image_emb: Tensor<B, 2>) -> Tensor<B, 2> {
        // MultiHeadAttention wants [batch, seq, d]; each pooled
        // embedding is a length-1 sequence.
        let query   = image_emb.unsqueeze_dim::<3>(1);
        let key_val = tweet_emb.clone().unsqueeze_dim::<3>(1);

        let attn = self
            .cross_attn
            .forward(MhaInput::new(query, key_val.clone(), key_val))
            .context
            .squeeze::<2>(1);

        // Residual onto the tweet embedding, then the MLP block with
        // a residual onto its own pre-activation input.
        let fused  = self.attn_norm.forward(attn + tweet_emb);
        let hidden = burn::tensor::activation::relu(self.linear1.forward(fused.clone()));
        let hidden = self.mlp_norm.forward(hidden + fused);
        self.linear2.forward(hidden)
    }
}

// ─── FusionClassifier ─────────────────────────────────────────────────────────
/// Tokenizer + frozen encoder + trainable fusion head, wired
/// together so callers hand over raw strings and get logits.
///
/// Not a Burn Module on purpose: the tokenizer is not a
/// parameterised layer, and keeping the head as the only module
/// the optimizer ever sees makes the freeze invariant structural.
pub struct FusionClassifier<B: Backend> {
    pub tokenizer:   Tokenizer,
    pub encoder:     TextEncoder<B>,
    pub head:        FusionHead<B>,
    pub max_seq_len: usize,
    pub device:      B::Device,
}

impl<B: Backend> FusionClassifier<B> {
    /// Forward one batch of raw texts → logits [batch, num_classes].
    ///
    /// Each modality is tokenized independently, padded to its own
    /// batch max length. Errors if the two batches differ in size.
    pub fn forward(
        &self,
        tweets:             &[String],
        image_descriptions: &[String],
    ) -> Result<Tensor<B, 2>> {
        if tweets.len() != image_descriptions.len() {
            anyhow::bail!(
                "Batch size mismatch: {} tweets vs {} image descriptions",
                tweets.len(),
                image_descriptions.len()
            );
        }

        let tweet_ids = encode_padded::<B>(
            &self.tokenizer, tweets, self.max_seq_len, &self.device,
        )?;
        let image_ids = encode_padded::<B>(
            &self.tokenizer, image_descriptions, self.max_seq_len, &self.device,
        )?;

        let tweet_emb = self.encoder.embed_mean(tweet_ids);
        let image_emb = self.encoder.embed_mean(image_ids);

        Ok(self.head.forward(tweet_emb, image_emb))
    }

    /// Total parameter count, frozen encoder included.
    pub fn total_params(&self) -> usize {
        self.encoder.num_params() + self.head.num_params()
    }

    /// Parameter count of the trainable fusion head only.
    pub fn trainable_params(&self) -> usize {
        self.head.num_params()
    }
}

impl<B: AutodiffBackend> FusionClassifier<B> {
    /// Map to the inner backend for evaluation: no gradient
    /// tracking, dropout disabled.
    pub fn valid(&self) -> FusionClassifier<B::InnerBackend> {
        FusionClassifier {
            tokenizer:   self.tokenizer.clone(),
            encoder:     self.encoder.valid(),
            head:        self.head.valid(),
            max_seq_len: self.max_seq_len,
            device:      self.device.clone(),
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::pretrained::PretrainedStore;
    use crate::ml::encoder::TextEncoderConfig;
    use burn::backend::{Autodiff, NdArray};
    use burn::optim::GradientsParams;

    type TestAutodiff = Autodiff<NdArray>;

    fn build_classifier<B: Backend>(name: &str, device: &B::Device) -> FusionClassifier<B> {
        let dir = std::env::temp_dir().join(name);
        let corpus = vec![
            "a small dog in the park".to_string(),
            "breaking news about cats".to_string(),
        ];
        let tokenizer = PretrainedStore::new(dir.to_string_lossy().into_owned())
            .load_or_build(&corpus, 64)
            .unwrap();

        let encoder = TextEncoderConfig::new(512, 16, 8, 2, 1, 16).init(device);
        let head = FusionHeadConfig::new(8, 4, 0.5, 2).init(device);

        FusionClassifier {
            tokenizer,
            encoder,
            head,
            max_seq_len: 16,
            device: device.clone(),
        }
    }

    #[test]
    fn test_forward_output_shape() {
        let device = Default::default();
        let classifier = build_classifier::<NdArray>("tweet_fusion_model_shape", &device);

        let tweets = vec!["a small dog".to_string(), "breaking news".to_string()];
        let images = vec!["dog in the park".to_string(), "cats".to_string()];

        let logits = classifier.forward(&tweets, &images).unwrap();
        assert_eq!(logits.dims(), [2, 2]);
    }

    #[test]
    fn test_batch_size_mismatch_is_an_error() {
        let device = Default::default();
        let classifier = build_classifier::<NdArray>("tweet_fusion_model_mismatch", &device);

        let tweets = vec!["one".to_string(), "two".to_string()];
        let images = vec!["only one".to_string()];

        assert!(classifier.forward(&tweets, &images).is_err());
    }

    #[test]
    fn test_head_param_count() {
        let device = Default::default();
        let head: FusionHead<NdArray> = FusionHeadConfig::new(16, 4, 0.5, 2).init(&device);

        // 4 attention projections (16x16 + 16), two layer norms
        // (2x16 each), linear1 (16x16 + 16), linear2 (16x2 + 2)
        let expected = 4 * (16 * 16 + 16) + 2 * (2 * 16) + (16 * 16 + 16) + (16 * 2 + 2);
        assert_eq!(head.num_params(), expected);
    }

    #[test]
    fn test_encoder_receives_no_gradients() {
        let device = Default::default();
        let classifier =
            build_classifier::<TestAutodiff>("tweet_fusion_model_frozen", &device);

        let tweets = vec!["a small dog".to_string(), "breaking news".to_string()];
        let images = vec!["dog in the park".to_string(), "cats".to_string()];

        // Encoder side: frozen at construction, so backward records nothing.
        let logits = classifier.forward(&tweets, &images).unwrap();
        let grads = logits.sum().backward();
        let encoder_grads = GradientsParams::from_grads(grads, &classifier.encoder);
        assert_eq!(encoder_grads.len(), 0);

        // Head side: every parameter is tracked.
        let logits = classifier.forward(&tweets, &images).unwrap();
        let grads = logits.sum().backward();
        let head_grads = GradientsParams::from_grads(grads, &classifier.head);
        assert!(head_grads.len() > 0);
    }
}
