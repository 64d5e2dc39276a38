// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, picks a backend, hands the work to
// Layer 2 and prints what comes back.
//
//   1. `init-config` — write a default model config
//   2. `inspect`     — parameter counts plus a synthetic smoke batch
//   3. `answer`      — top-k answers and attention for each request

pub mod commands;

use anyhow::Result;
use burn::backend::{wgpu::WgpuDevice, NdArray, Wgpu};
use clap::Parser;
use commands::{AnswerArgs, BackendKind, Commands, InitConfigArgs, InspectArgs};

use crate::application::{
    answer_use_case::{AnswerUseCase, AnsweredRequest},
    init_config_use_case::InitConfigUseCase,
    inspect_use_case::{InspectReport, InspectUseCase},
};

#[derive(Parser, Debug)]
#[command(
    name = "qv-hadamard",
    version,
    about = "Question-guided Hadamard attention over image regions for VQA."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::InitConfig(args) => run_init_config(args),
            Commands::Inspect(args)    => run_inspect(args),
            Commands::Answer(args)     => run_answer(args),
        }
    }
}

fn run_init_config(args: InitConfigArgs) -> Result<()> {
    let out = args.out.clone();
    let cfg = InitConfigUseCase::new(args.into()).execute()?;
    println!("Config written to {out} ({} logits)", cfg.num_logits());
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let backend  = args.backend;
    let use_case = InspectUseCase::new(args.into());

    let report = match backend {
        BackendKind::Ndarray => use_case.execute::<NdArray>(Default::default())?,
        BackendKind::Wgpu    => use_case.execute::<Wgpu>(WgpuDevice::default())?,
    };
    print_report(&report);
    Ok(())
}

fn run_answer(args: AnswerArgs) -> Result<()> {
    let backend  = args.backend;
    let use_case = AnswerUseCase::new(args.into());

    let answered = match backend {
        BackendKind::Ndarray => use_case.execute::<NdArray>(Default::default())?,
        BackendKind::Wgpu    => use_case.execute::<Wgpu>(WgpuDevice::default())?,
    };
    for (i, request) in answered.iter().enumerate() {
        print_answer(i, request);
    }
    Ok(())
}

fn print_report(report: &InspectReport) {
    println!("\nParameters");
    for part in &report.components {
        println!("  {:<12} {:>12}", part.name, part.params);
    }
    println!("  {:<12} {:>12}", "total", report.total_params);

    if let Some(smoke) = &report.smoke {
        println!(
            "\nSmoke batch: {} pairs × {} regions → logits {:?}, attention error {:.2e}",
            smoke.batch_size, smoke.num_regions, smoke.logits_shape, smoke.attention_error
        );
    }
}

fn print_answer(index: usize, request: &AnsweredRequest) {
    match &request.question {
        Some(q) => println!("\n[{index}] {q}"),
        None    => println!("\n[{index}]"),
    }
    for answer in &request.prediction.answers {
        let label = answer.label.as_deref().unwrap_or("?");
        println!(
            "  {:>6.2}%  #{:<5} {}",
            answer.probability * 100.0,
            answer.answer_id,
            label
        );
    }

    let peak = request.prediction.attention
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1));
    if let Some((region, weight)) = peak {
        println!("  attention peaks at region {region} ({weight:.3})");
    }
}
