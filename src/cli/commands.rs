// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands: `init-config`, `inspect` and `answer`.
//
// Each Args struct converts into its use case's config, so the
// application layer never sees clap types.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::{
    answer_use_case::AnswerConfig,
    init_config_use_case::InitConfig,
    inspect_use_case::InspectConfig,
};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a model config with default sizes
    InitConfig(InitConfigArgs),

    /// Build the model, report parameter counts and run a smoke batch
    Inspect(InspectArgs),

    /// Answer questions about pre-extracted image regions
    Answer(AnswerArgs),
}

/// Where the tensors live
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// CPU, via ndarray
    #[default]
    Ndarray,
    /// GPU, via wgpu
    Wgpu,
}

#[derive(Args, Debug)]
pub struct InitConfigArgs {
    /// Config file to write
    #[arg(long, default_value = "qv_hadamard.json")]
    pub out: String,

    /// Number of answer classes, including the held-out class 0
    #[arg(long)]
    pub num_ans: usize,

    /// Word embedding rows when no pretrained table is used
    #[arg(long, default_value_t = 20000)]
    pub vocab_size: usize,

    /// Longest question, in tokens, fed to the encoder
    #[arg(long, default_value_t = 14)]
    pub max_question_len: usize,

    /// Hidden size of the encoder, projections and classifier
    #[arg(long, default_value_t = 1024)]
    pub num_hid: usize,

    /// L2-normalise region vectors before attention
    #[arg(long)]
    pub normalize_regions: bool,
}

impl From<InitConfigArgs> for InitConfig {
    fn from(a: InitConfigArgs) -> Self {
        InitConfig {
            out_path:          a.out,
            num_ans:           a.num_ans,
            vocab_size:        a.vocab_size,
            max_question_len:  a.max_question_len,
            num_hid:           a.num_hid,
            normalize_regions: a.normalize_regions,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Config file written by `init-config`
    #[arg(long, default_value = "qv_hadamard.json")]
    pub config: String,

    #[arg(long, value_enum, default_value_t = BackendKind::Ndarray)]
    pub backend: BackendKind,

    /// Synthetic pairs to push through the model; 0 skips the check
    #[arg(long, default_value_t = 4)]
    pub smoke_batch: usize,

    /// Regions per synthetic image
    #[arg(long, default_value_t = 36)]
    pub num_regions: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

impl From<InspectArgs> for InspectConfig {
    fn from(a: InspectArgs) -> Self {
        InspectConfig {
            config_path: a.config,
            smoke_batch: a.smoke_batch,
            num_regions: a.num_regions,
            seed:        a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct AnswerArgs {
    /// Config file written by `init-config`
    #[arg(long, default_value = "qv_hadamard.json")]
    pub config: String,

    /// JSON array of requests: question or token_ids, regions, optional spatial
    #[arg(long)]
    pub requests: String,

    /// tokenizer.json; built from the embeddings' words if missing
    #[arg(long)]
    pub tokenizer: Option<String>,

    /// GloVe text file whose width matches the config's q_dim
    #[arg(long)]
    pub embeddings: Option<String>,

    /// Read at most this many word vectors
    #[arg(long)]
    pub embeddings_limit: Option<usize>,

    /// JSON array of answer labels, index = answer id
    #[arg(long)]
    pub answers: Option<String>,

    #[arg(long, default_value_t = 5)]
    pub top_k: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, value_enum, default_value_t = BackendKind::Ndarray)]
    pub backend: BackendKind,
}

impl From<AnswerArgs> for AnswerConfig {
    fn from(a: AnswerArgs) -> Self {
        AnswerConfig {
            config_path:      a.config,
            requests_path:    a.requests,
            tokenizer_path:   a.tokenizer,
            embeddings_path:  a.embeddings,
            embeddings_limit: a.embeddings_limit,
            answers_path:     a.answers,
            top_k:            a.top_k,
            batch_size:       a.batch_size,
        }
    }
}
