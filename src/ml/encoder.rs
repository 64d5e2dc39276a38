// ============================================================
// Layer 5 — Question Encoder
// ============================================================
// Token ids → word embeddings → bidirectional GRU → one vector
// per question: [final forward state ‖ final backward state].
//
// Questions in a batch are zero-padded to a common length. The
// true lengths decide which GRU states are read:
//   - forward direction:  state at position len - 1
//   - backward direction: the first `len` tokens are reversed in
//     place (padding stays at the tail), so the backward GRU also
//     finishes its real tokens at position len - 1
// Padding therefore never leaks into the question vector.
//
// Reference: Cho et al. (2014) GRU
//            Burn Book §3 (Building Blocks)

use burn::{
    module::Param,
    nn::{
        gru::{Gru, GruConfig},
        Embedding, EmbeddingConfig,
    },
    prelude::*,
};

/// Token id reserved for padding; always embeds to the zero vector.
pub const PAD_ID: i32 = 0;

#[derive(Config, Debug)]
pub struct QuestionEncoderConfig {
    pub vocab_size:  usize,
    pub embed_dim:   usize,
    /// Hidden size of each GRU direction; output width is twice this
    pub hidden_size: usize,
}

impl QuestionEncoderConfig {
    /// Randomly initialised embedding table.
    pub fn init<B: Backend>(&self, device: &B::Device) -> QuestionEncoder<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device);
        self.build(embedding, device)
    }

    /// Use a pretrained [vocab, embed_dim] table. The table's row count
    /// overrides `vocab_size`.
    ///
    /// # Panics
    ///
    /// If the table is not `embed_dim` columns wide.
    pub fn init_with_embeddings<B: Backend>(
        &self,
        table:  Tensor<B, 2>,
        device: &B::Device,
    ) -> QuestionEncoder<B> {
        let [vocab, dim] = table.dims();
        assert_eq!(
            dim, self.embed_dim,
            "pretrained embedding width {dim} does not match embed_dim {}",
            self.embed_dim
        );
        let mut embedding = EmbeddingConfig::new(vocab, dim).init(device);
        embedding.weight  = Param::from_tensor(table);
        self.build(embedding, device)
    }

    fn build<B: Backend>(&self, embedding: Embedding<B>, device: &B::Device) -> QuestionEncoder<B> {
        let gru = || {
            GruConfig::new(self.embed_dim, self.hidden_size, true)
                .with_reset_after(true)
                .init(device)
        };
        QuestionEncoder {
            embedding,
            gru_forward:  gru(),
            gru_backward: gru(),
        }
    }
}

#[derive(Module, Debug)]
pub struct QuestionEncoder<B: Backend> {
    pub embedding:    Embedding<B>,
    pub gru_forward:  Gru<B>,
    pub gru_backward: Gru<B>,
}

impl<B: Backend> QuestionEncoder<B> {
    /// tokens: [batch, seq_len] → [batch, seq_len, embed_dim]
    pub fn embed(&self, tokens: Tensor<B, 2, Int>) -> Tensor<B, 3> {
        let embedded = self.embedding.forward(tokens.clone());
        let [_, _, embed_dim] = embedded.dims();
        let keep = tokens
            .not_equal_elem(PAD_ID)
            .float()
            .unsqueeze_dim::<3>(2)
            .repeat_dim(2, embed_dim);
        embedded * keep
    }

    /// tokens: [batch, seq_len], lengths: [batch] → [batch, 2 * hidden_size]
    ///
    /// Lengths are clamped into [1, seq_len].
    pub fn forward(&self, tokens: Tensor<B, 2, Int>, lengths: Tensor<B, 1, Int>) -> Tensor<B, 2> {
        let [batch, seq_len] = tokens.dims();
        let device = tokens.device();

        let embedded = self.embed(tokens);
        let [_, _, embed_dim] = embedded.dims();

        let lengths = lengths
            .clamp(1i64, seq_len as i64)
            .reshape([batch, 1]);

        // Reverse each question within its own length.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .reshape([1, seq_len])
            .repeat_dim(0, batch);
        let lengths_wide = lengths.clone().repeat_dim(1, seq_len);
        let in_question  = positions.clone().lower(lengths_wide.clone());
        let mirrored     = (lengths_wide - positions.clone()).sub_scalar(1);
        let reversed_idx = positions
            .mask_where(in_question, mirrored)
            .unsqueeze_dim::<3>(2)
            .repeat_dim(2, embed_dim);
        let reversed = embedded.clone().gather(1, reversed_idx);

        let forward_states  = self.gru_forward.forward(embedded, None);
        let backward_states = self.gru_backward.forward(reversed, None);
        let [_, _, hidden] = forward_states.dims();

        let last = lengths
            .sub_scalar(1)
            .unsqueeze_dim::<3>(2)
            .repeat_dim(2, hidden);
        let forward_last  = forward_states.gather(1, last.clone()).reshape([batch, hidden]);
        let backward_last = backward_states.gather(1, last).reshape([batch, hidden]);

        Tensor::cat(vec![forward_last, backward_last], 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use float_cmp::approx_eq;

    type TestBackend = NdArray;

    fn encoder(device: &<TestBackend as Backend>::Device) -> QuestionEncoder<TestBackend> {
        QuestionEncoderConfig::new(20, 6, 5).init(device)
    }

    #[test]
    fn test_padding_token_embeds_to_zero() {
        let device = Default::default();
        let enc    = encoder(&device);

        let tokens = Tensor::<TestBackend, 2, Int>::from_ints([[0, 4, 0]], &device);
        let rows: Vec<f32> = enc.embed(tokens).into_data().to_vec::<f32>().unwrap();

        assert!(rows[0..6].iter().all(|&v| v == 0.0));
        assert!(rows[6..12].iter().any(|&v| v != 0.0));
        assert!(rows[12..18].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pretrained_table_is_used() {
        let device = Default::default();
        let table  = Tensor::<TestBackend, 1, Int>::arange(0..12, &device)
            .float()
            .reshape([4, 3]);
        let enc = QuestionEncoderConfig::new(999, 3, 2).init_with_embeddings(table, &device);

        let tokens = Tensor::<TestBackend, 2, Int>::from_ints([[2]], &device);
        let row: Vec<f32> = enc.embed(tokens).into_data().to_vec::<f32>().unwrap();
        assert_eq!(row, vec![6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_output_concatenates_both_directions() {
        let device = Default::default();
        let enc    = encoder(&device);

        let tokens  = Tensor::<TestBackend, 2, Int>::from_ints([[3, 9, 2, 0], [7, 1, 0, 0]], &device);
        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([3, 2], &device);

        assert_eq!(enc.forward(tokens, lengths).dims(), [2, 10]);
    }

    #[test]
    fn test_trailing_padding_does_not_change_encoding() {
        let device = Default::default();
        let enc    = encoder(&device);

        let short = Tensor::<TestBackend, 2, Int>::from_ints([[5, 3, 7]], &device);
        let long  = Tensor::<TestBackend, 2, Int>::from_ints([[5, 3, 7, 0, 0, 0]], &device);
        let len   = || Tensor::<TestBackend, 1, Int>::from_ints([3], &device);

        let a: Vec<f32> = enc.forward(short, len()).into_data().to_vec::<f32>().unwrap();
        let b: Vec<f32> = enc.forward(long, len()).into_data().to_vec::<f32>().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!(approx_eq!(f32, *x, *y, epsilon = 1e-5));
        }
    }

    #[test]
    fn test_zero_length_is_clamped() {
        let device = Default::default();
        let enc    = encoder(&device);

        let tokens  = Tensor::<TestBackend, 2, Int>::from_ints([[0, 0]], &device);
        let lengths = Tensor::<TestBackend, 1, Int>::from_ints([0], &device);

        assert_eq!(enc.forward(tokens, lengths).dims(), [1, 10]);
    }
}
