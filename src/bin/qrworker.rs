use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use qr_workers::tools::{dataset_iter, load_image_data};
use qr_workers::{Backend, Request, Response, WorkerConfig, WorkerError, spawn_backend};
use rayon::prelude::*;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "qrworker", version, about = "QR decoding workers")]
struct Cli {
    /// Decoder backend (rqrr or quirc); defaults to QR_WORKER_BACKEND
    #[arg(long, global = true)]
    backend: Option<Backend>,

    /// Do not retry on the inverted image
    #[arg(long, global = true)]
    no_invert: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one detect request on an image file
    Detect {
        #[arg(long)]
        image: PathBuf,
        /// Print the raw protocol response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Answer JSON-lines requests from stdin on stdout
    Serve,
    /// Detect every image under a directory and report the reading rate
    Batch {
        #[arg(long)]
        root: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = WorkerConfig::from_env();
    if let Some(backend) = cli.backend {
        config = config.with_backend(backend);
    }
    if cli.no_invert {
        config = config.with_try_inverted(false);
    }

    match cli.command {
        Command::Detect { image, json } => detect_cmd(&config, &image, json),
        Command::Serve => serve_cmd(&config),
        Command::Batch { root, limit } => batch_cmd(&config, &root, limit),
    }
}

fn detect_cmd(config: &WorkerConfig, image: &Path, json: bool) -> Result<()> {
    let data = load_image_data(image)
        .with_context(|| format!("failed to load image {}", image.display()))?;
    let (width, height) = (data.width, data.height);
    let worker = spawn_backend(config).context("failed to start worker")?;

    worker.post_message(Request::detect(data))?;
    let response = worker
        .messages()
        .recv()
        .context("worker exited without responding")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Image: {} ({}x{})", image.display(), width, height);
    match response {
        Response::Result { result } => {
            println!("Found {} QR codes with {}", result.len(), worker.backend());
            for (i, code) in result.iter().enumerate() {
                let b = &code.bounding_box;
                println!(
                    "  QR {}: box=({:.0},{:.0} {:.0}x{:.0}) content={}",
                    i, b.x, b.y, b.width, b.height, code.raw_value
                );
            }
        }
        Response::Error { message } => println!("Error: {message}"),
    }
    Ok(())
}

fn serve_cmd(config: &WorkerConfig) -> Result<()> {
    let worker = spawn_backend(config).context("failed to start worker")?;
    info!(backend = worker.backend(), "serving JSON-lines requests on stdin");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => {
                worker.post_message(request)?;
                worker
                    .messages()
                    .recv()
                    .context("worker exited without responding")?
            }
            Err(err) => {
                warn!(error = %err, "malformed request line");
                Response::Error {
                    message: format!("malformed request: {err}"),
                }
            }
        };

        serde_json::to_writer(&mut stdout, &response)?;
        stdout.write_all(b"\n")?;
        stdout.flush()?;
    }
    Ok(())
}

fn batch_cmd(config: &WorkerConfig, root: &Path, limit: Option<usize>) -> Result<()> {
    let paths: Vec<PathBuf> = dataset_iter(root, limit).collect();
    if paths.is_empty() {
        anyhow::bail!("no images found under {}", root.display());
    }

    // Image decoding is the slow part of loading; do it on the rayon pool
    let loaded: Vec<_> = paths
        .par_iter()
        .map(|path| (path, load_image_data(path)))
        .collect();

    let worker = spawn_backend(config).context("failed to start worker")?;
    let start = Instant::now();
    let mut with_codes = 0usize;
    let mut failures = 0usize;

    for (path, data) in loaded {
        let data = match data {
            Ok(data) => data,
            Err(err) => {
                failures += 1;
                println!("{}: load failed: {}", path.display(), err);
                continue;
            }
        };
        match worker.detect_blocking(data) {
            Ok(codes) => {
                if !codes.is_empty() {
                    with_codes += 1;
                }
                let values: Vec<&str> = codes.iter().map(|c| c.raw_value.as_str()).collect();
                println!("{}: {} codes {:?}", path.display(), codes.len(), values);
            }
            Err(WorkerError::Remote(message)) => {
                failures += 1;
                println!("{}: error: {}", path.display(), message);
            }
            Err(err) => return Err(err.into()),
        }
    }

    let elapsed = start.elapsed();
    let total = paths.len();
    println!(
        "Backend {}: {}/{} images with codes ({:.1}%), {} failures, {:.1} ms/image",
        worker.backend(),
        with_codes,
        total,
        with_codes as f64 * 100.0 / total as f64,
        failures,
        elapsed.as_secs_f64() * 1000.0 / total as f64
    );
    Ok(())
}
