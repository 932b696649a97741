//! digit-net command line driver.
//!
//! Trains a 784 → hidden → 10 sigmoid network on the MNIST CSV training set,
//! or evaluates a saved model on the CSV test set.
//!
//! Run with:
//!   cargo run --release -- train   --train-csv mnist_dataset/mnist_train.csv
//!   cargo run --release -- predict --test-csv  mnist_dataset/mnist_test.csv

use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use digit_net::data::read_csv;
use digit_net::train::DEFAULT_EPOCHS;
use digit_net::{evaluate, train_loop, EpochStats, Network, NetworkSpec, TrainConfig};

#[derive(Parser)]
#[command(name = "digit-net", version, about = "Handwritten digit recognition with a one-hidden-layer network")]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a fresh network and save its weights
    Train {
        #[arg(long, default_value = "mnist_dataset/mnist_train.csv")]
        train_csv: String,

        /// Where to write the trained model
        #[arg(long, default_value = "data/model.json")]
        model: String,

        #[arg(long, default_value_t = DEFAULT_EPOCHS)]
        epochs: usize,

        /// Architecture JSON file; defaults to 784-200-10 with rate 0.1
        #[arg(long)]
        spec: Option<String>,

        /// Write the architecture actually used to this JSON file
        #[arg(long)]
        save_spec: Option<String>,

        /// Overrides the hidden layer size
        #[arg(long)]
        hidden: Option<usize>,

        /// Overrides the learning rate
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Seed for weight initialization; random if omitted
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Evaluate a saved network on a test set
    Predict {
        #[arg(long, default_value = "mnist_dataset/mnist_test.csv")]
        test_csv: String,

        #[arg(long, default_value = "data/model.json")]
        model: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Train { train_csv, model, epochs, spec, save_spec, hidden, learning_rate, seed } => {
            let mut net_spec = match spec {
                Some(path) => NetworkSpec::load_json(&path).with_context(|| format!("loading spec {path}"))?,
                None => NetworkSpec::default(),
            };
            if let Some(hidden) = hidden {
                net_spec.hiddens = hidden;
            }
            if let Some(rate) = learning_rate {
                net_spec.learning_rate = rate;
            }
            if let Some(path) = save_spec {
                net_spec.validate()?;
                net_spec.save_json(&path).with_context(|| format!("saving spec to {path}"))?;
            }
            train(&net_spec, &train_csv, &model, epochs, seed)
        }
        Command::Predict { test_csv, model } => predict(&test_csv, &model),
    }
}

fn train(spec: &NetworkSpec, train_csv: &str, model: &str, epochs: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut network = Network::from_spec(spec, &mut rng).context("building network")?;
    info!(inputs = spec.inputs, hiddens = spec.hiddens, outputs = spec.outputs, rate = spec.learning_rate, "network ready");

    let samples = read_csv(train_csv, spec.inputs, spec.outputs)
        .with_context(|| format!("reading training set {train_csv}"))?;
    info!(samples = samples.len(), epochs, "training");

    let t_start = Instant::now();
    let (tx, rx) = mpsc::channel::<EpochStats>();
    let config = TrainConfig { epochs, progress_tx: Some(tx) };
    let network_ref = &mut network;
    let samples_ref = &samples;
    let outcome = thread::scope(|s| {
        // `config` moves into the worker, so the sender drops when training ends.
        let worker = s.spawn(move || train_loop(network_ref, samples_ref, &config));
        for stats in rx {
            println!(
                "epoch {}/{}  mse {:.6}  ({} ms)",
                stats.epoch, stats.total_epochs, stats.mean_squared_error, stats.elapsed_ms
            );
        }
        worker.join()
    });
    outcome
        .map_err(|_| anyhow::anyhow!("training thread panicked"))?
        .context("training")?;
    let elapsed = t_start.elapsed();
    println!("\nTime taken to train: {elapsed:?}");

    if let Some(dir) = std::path::Path::new(model).parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    network.save_json(model).with_context(|| format!("saving model to {model}"))?;
    info!(path = model, "model saved");
    Ok(())
}

fn predict(test_csv: &str, model: &str) -> Result<()> {
    let network = Network::load_json(model).with_context(|| format!("loading model {model}"))?;
    let samples = read_csv(test_csv, network.inputs(), network.outputs())
        .with_context(|| format!("reading test set {test_csv}"))?;

    let evaluation = evaluate(&network, &samples)?;

    println!("Time taken to check: {:?}", evaluation.elapsed);
    println!("Tests run: {}", evaluation.tests);
    println!("score: {}", evaluation.score);
    info!(accuracy = evaluation.accuracy(), "evaluation done");
    Ok(())
}
