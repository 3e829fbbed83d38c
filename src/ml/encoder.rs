// ============================================================
// Layer 5 — Frozen Text Encoder
// ============================================================
// A transformer text encoder shared by both modalities. The
// classifier mean-pools its last hidden state into one
// fixed-width vector per input text.
//
// Freezing is a configuration capability, not an imperative
// loop over parameters: `TextEncoderConfig::trainable = false`
// applies Module::no_grad() at construction, so on an autodiff
// backend none of the encoder's parameters are ever tracked.
//
// Reference: Burn Book §3 (Building Blocks)
//            Devlin et al. (2019) BERT

use anyhow::Result;
use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};
use tokenizers::Tokenizer;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct TextEncoderConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    #[config(default = 0.1)]
    pub dropout:     f64,
    /// When false (the default here), all encoder parameters are
    /// excluded from gradient tracking at construction time.
    #[config(default = false)]
    pub trainable:   bool,
}

impl TextEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TextEncoder<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();

        let encoder = TextEncoder {
            token_embedding, position_embedding, layers,
            final_norm, dropout,
            max_seq_len: self.max_seq_len,
        };

        if self.trainable {
            encoder
        } else {
            encoder.no_grad()
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TextEncoder<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
}

impl<B: Backend> TextEncoder<B> {
    /// input_ids: [batch, seq_len] → last hidden state [batch, seq_len, d_model]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        self.final_norm.forward(x)
    }

    /// Mean-pool the last hidden state over the token axis:
    /// [batch, seq_len] ids → [batch, d_model] embedding.
    ///
    /// The mean runs over the full padded sequence, padding
    /// included — one fixed-width vector per text.
    pub fn embed_mean(&self, input_ids: Tensor<B, 2, Int>) -> Tensor<B, 2> {
        self.forward(input_ids).mean_dim(1).squeeze::<2>(1)
    }
}

// ─── Batch tokenization ───────────────────────────────────────────────────────

/// Tokenize a batch of raw texts into one [batch, max_len] id tensor,
/// padded with 0 to this batch's own max length and truncated to
/// `max_seq_len`. The two modalities are encoded independently, so
/// their token tensors have no cross-batch length alignment.
pub fn encode_padded<B: Backend>(
    tokenizer:   &Tokenizer,
    texts:       &[String],
    max_seq_len: usize,
    device:      &B::Device,
) -> Result<Tensor<B, 2, Int>> {
    let mut ids_per_text: Vec<Vec<u32>> = Vec::with_capacity(texts.len());

    for text in texts {
        let enc = tokenizer
            .encode(text.as_str(), true)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        let mut ids = enc.get_ids().to_vec();
        ids.truncate(max_seq_len);
        ids_per_text.push(ids);
    }

    // Pad to this batch's max length; at least 1 so an all-empty
    // batch still produces a valid tensor.
    let batch_max = ids_per_text
        .iter()
        .map(|ids| ids.len())
        .max()
        .unwrap_or(1)
        .max(1);

    let flat: Vec<i32> = ids_per_text
        .iter()
        .flat_map(|ids| {
            ids.iter()
                .map(|&id| id as i32)
                .chain(std::iter::repeat(0).take(batch_max - ids.len()))
        })
        .collect();

    let batch_size = texts.len();
    Ok(Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
        .reshape([batch_size, batch_max]))
}
