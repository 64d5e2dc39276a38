// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Question text → token ids, through a HuggingFace WordLevel
// tokenizer saved as tokenizer.json.
//
// The id layout is fixed so it lines up with the embedding table:
//   0          [PAD]   (embeds to the zero vector)
//   1          [UNK]
//   2, 3, ...  vocabulary words in the order given
//
// When no tokenizer file exists yet, one is built from the word
// list of the pretrained embeddings. An existing file must pass
// `check_aligned` against that list before row i of the embedding
// table can be taken to belong to token id i.
//
// Reference: HuggingFace tokenizers JSON format

use anyhow::{bail, ensure, Context, Result};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};
use tokenizers::Tokenizer;

use crate::domain::traits::QuestionTokenizer;

pub const PAD_TOKEN: &str = "[PAD]";
pub const UNK_TOKEN: &str = "[UNK]";

/// Ids taken by [PAD] and [UNK] before the first vocabulary word.
pub const RESERVED_IDS: usize = 2;

pub struct TokenizerStore {
    path: PathBuf,
}

impl TokenizerStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Load the tokenizer if the file exists, otherwise build it from `words`.
    pub fn load_or_build(&self, words: &[String]) -> Result<WordTokenizer> {
        if self.path.exists() {
            tracing::info!("Loading tokenizer from '{}'", self.path.display());
            self.load()
        } else {
            tracing::info!("Building tokenizer over {} words", words.len());
            self.build_and_save(words)
        }
    }

    pub fn load(&self) -> Result<WordTokenizer> {
        let tokenizer = Tokenizer::from_file(&self.path)
            .map_err(|e| anyhow::anyhow!(
                "Cannot load tokenizer from '{}': {}", self.path.display(), e
            ))?;
        Ok(WordTokenizer { tokenizer })
    }

    /// Write a WordLevel tokenizer JSON for `words` and load it back.
    /// Repeated words keep their first id.
    pub fn build_and_save(&self, words: &[String]) -> Result<WordTokenizer> {
        ensure!(!words.is_empty(), "cannot build a tokenizer from an empty vocabulary");

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        // ── Vocabulary ────────────────────────────────────────────────────────
        let mut vocab = serde_json::Map::new();
        vocab.insert(PAD_TOKEN.to_string(), serde_json::json!(0));
        vocab.insert(UNK_TOKEN.to_string(), serde_json::json!(1));

        let mut seen    = HashSet::new();
        let mut next_id = RESERVED_IDS;
        for word in words {
            if word == PAD_TOKEN || word == UNK_TOKEN || !seen.insert(word.as_str()) {
                continue;
            }
            vocab.insert(word.clone(), serde_json::json!(next_id));
            next_id += 1;
        }

        // ── Tokenizer JSON ────────────────────────────────────────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "BertNormalizer",
                "clean_text": true,
                "handle_chinese_chars": true,
                "strip_accents": null,
                "lowercase": true
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        std::fs::write(&self.path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer to '{}'", self.path.display()))?;

        tracing::info!(
            "Tokenizer built with {} ids, saved to '{}'",
            next_id,
            self.path.display()
        );

        self.load()
    }
}

/// A loaded tokenizer, usable through the QuestionTokenizer trait.
pub struct WordTokenizer {
    tokenizer: Tokenizer,
}

impl WordTokenizer {
    pub fn vocab_size(&self) -> usize {
        self.tokenizer.get_vocab_size(true)
    }

    /// Check that word `j` of `words` has id `j + RESERVED_IDS`, so a table
    /// laid out from the same list is indexed correctly by this tokenizer.
    pub fn check_aligned(&self, words: &[String]) -> Result<()> {
        let expected = words.len() + RESERVED_IDS;
        ensure!(
            self.vocab_size() == expected,
            "tokenizer has {} ids but the word list needs {}",
            self.vocab_size(),
            expected
        );
        for (j, word) in words.iter().enumerate() {
            let want = (j + RESERVED_IDS) as u32;
            match self.tokenizer.token_to_id(word) {
                Some(id) if id == want => {}
                Some(id) => bail!("'{word}' has id {id}, expected {want}"),
                None     => bail!("'{word}' is missing from the tokenizer"),
            }
        }
        Ok(())
    }
}

impl QuestionTokenizer for WordTokenizer {
    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer
            .encode(text, false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        Ok(encoding.get_ids().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("qv_hadamard_tok_{}", std::process::id()))
            .join(name)
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_ids_follow_word_order() {
        let store = TokenizerStore::new(temp_path("order.json"));
        let tok   = store.build_and_save(&words(&["what", "color", "is", "the", "bus"])).unwrap();

        assert_eq!(tok.encode("What color is the bus").unwrap(), vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let store = TokenizerStore::new(temp_path("unk.json"));
        let tok   = store.build_and_save(&words(&["red", "car"])).unwrap();

        assert_eq!(tok.encode("red bicycle").unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_duplicates_keep_first_id() {
        let store = TokenizerStore::new(temp_path("dupes.json"));
        let tok   = store.build_and_save(&words(&["cat", "dog", "cat", "bird"])).unwrap();

        assert_eq!(tok.encode("bird cat").unwrap(), vec![4, 2]);
        assert_eq!(tok.vocab_size(), 5);
    }

    #[test]
    fn test_load_or_build_reuses_file() {
        let path  = temp_path("reuse.json");
        let store = TokenizerStore::new(&path);
        store.build_and_save(&words(&["one", "two"])).unwrap();

        // A different word list is ignored once the file exists
        let tok = store.load_or_build(&words(&["three"])).unwrap();
        assert_eq!(tok.encode("two").unwrap(), vec![3]);
        assert!(tok.check_aligned(&words(&["three"])).is_err());
    }

    #[test]
    fn test_alignment_with_word_list() {
        let store = TokenizerStore::new(temp_path("aligned.json"));
        let tok   = store.build_and_save(&words(&["blue", "red"])).unwrap();

        assert!(tok.check_aligned(&words(&["blue", "red"])).is_ok());

        // same words, different order: ids point at the wrong rows
        let err = tok.check_aligned(&words(&["red", "blue"])).unwrap_err();
        assert!(err.to_string().contains("'red' has id 3, expected 2"));

        // a prefix of the vocabulary leaves extra ids behind
        assert!(tok.check_aligned(&words(&["blue"])).is_err());
    }

    #[test]
    fn test_empty_vocabulary_rejected() {
        let store = TokenizerStore::new(temp_path("empty.json"));
        assert!(store.build_and_save(&[]).is_err());
    }
}
