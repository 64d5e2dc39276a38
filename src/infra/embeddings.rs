// ============================================================
// Layer 6 — Pretrained Word Embeddings
// ============================================================
// Reads GloVe-style text files:
//
//   the 0.418 0.24968 -0.41242 ...
//   ,   0.013441 0.23682 -0.16899 ...
//
// and lays them out as an embedding table whose row i is token
// id i under the tokenizer built from the same word list:
//
//   row 0      [PAD]  zeros
//   row 1      [UNK]  zeros
//   row 2..    words in file order (first occurrence wins)
//
// Lines for the reserved tokens themselves are skipped, exactly as
// the tokenizer builder skips them.

use anyhow::{bail, ensure, Context, Result};
use burn::prelude::*;
use std::{
    collections::HashSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::infra::tokenizer_store::{PAD_TOKEN, RESERVED_IDS, UNK_TOKEN};

#[derive(Debug, Clone)]
pub struct PretrainedEmbeddings {
    words:  Vec<String>,
    dim:    usize,
    /// Row-major [words.len(), dim]
    values: Vec<f32>,
}

impl PretrainedEmbeddings {
    /// Read at most `limit` words from a GloVe file. Every vector must have
    /// `dim` components.
    pub fn load(path: impl AsRef<Path>, dim: usize, limit: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Cannot open embeddings '{}'", path.display()))?;

        let embeddings = Self::from_reader(BufReader::new(file), dim, limit)
            .with_context(|| format!("Bad embeddings file '{}'", path.display()))?;

        tracing::info!(
            "Loaded {} word vectors of width {} from '{}'",
            embeddings.words.len(),
            dim,
            path.display()
        );
        Ok(embeddings)
    }

    pub fn from_reader<R: BufRead>(reader: R, dim: usize, limit: Option<usize>) -> Result<Self> {
        let limit = limit.unwrap_or(usize::MAX);

        let mut words  = Vec::new();
        let mut values = Vec::new();
        let mut seen   = HashSet::new();

        for (line_no, line) in reader.lines().enumerate() {
            if words.len() >= limit {
                break;
            }
            let line = line?;
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else { continue };

            let vector: Vec<f32> = parts
                .map(str::parse::<f32>)
                .collect::<Result<_, _>>()
                .with_context(|| format!("line {}: non-numeric component", line_no + 1))?;
            if vector.len() != dim {
                bail!(
                    "line {}: '{}' has {} components, expected {}",
                    line_no + 1,
                    word,
                    vector.len(),
                    dim
                );
            }

            if word == PAD_TOKEN || word == UNK_TOKEN {
                tracing::debug!("Skipping reserved token '{}' on line {}", word, line_no + 1);
                continue;
            }
            if seen.insert(word.to_string()) {
                words.push(word.to_string());
                values.extend(vector);
            }
        }

        ensure!(!words.is_empty(), "no word vectors found");
        Ok(Self { words, dim, values })
    }

    /// Vocabulary words in id order, without the reserved tokens
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Rows in the table, reserved rows included
    pub fn table_rows(&self) -> usize {
        self.words.len() + RESERVED_IDS
    }

    /// Row-major table with zero rows for [PAD] and [UNK].
    pub fn table(&self) -> Vec<f32> {
        let mut table = vec![0.0; RESERVED_IDS * self.dim];
        table.extend_from_slice(&self.values);
        table
    }

    pub fn to_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(self.table().as_slice(), device)
            .reshape([self.table_rows(), self.dim])
    }
}
