use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use dsi_progress_logger::{ProgressLog, ProgressLogger};
use jxl_entropy::utils::entropy;
use jxl_entropy::{BitReader, BitStreamReader, Distribution, EntropyStream, ANS_TAB_SIZE};
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(about = "Decodes the symbols of an entropy-coded stream", long_about = None)]
struct Args {
    /// The file holding the stream.
    path: PathBuf,

    /// The number of contexts of the stream, LZ77 distances excluded.
    #[arg(short = 'n', long)]
    num_dists: usize,

    /// How many symbols to decode.
    #[arg(short = 'k', long)]
    count: usize,

    /// The context every symbol is decoded under.
    #[arg(short, long, default_value_t = 0)]
    context: usize,

    /// The row width LZ77 special distances refer to; zero disables them.
    #[arg(short, long, default_value_t = 0)]
    multiplier: u32,

    /// How many bytes of the file precede the stream.
    #[arg(short, long, default_value_t = 0)]
    skip_bytes: usize,
}

pub fn main() -> Result<()> {
    stderrlog::new()
        .verbosity(2)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let args = Args::parse();

    let data = std::fs::read(&args.path)
        .with_context(|| format!("cannot read {}", args.path.display()))?;
    ensure!(
        args.skip_bytes <= data.len(),
        "cannot skip {} bytes of a {}-byte file",
        args.skip_bytes,
        data.len()
    );

    let mut reader = BitStreamReader::new(&data[args.skip_bytes..]);
    let mut stream = EntropyStream::new(&mut reader, args.num_dists, false)?;

    info!(
        "Stream header: {} bits, {} contexts, {} clusters",
        reader.bits_read(),
        stream.num_contexts(),
        stream.num_clusters()
    );
    for (cluster, distribution) in stream.distributions().iter().enumerate() {
        if let Distribution::Ans(distribution) = distribution {
            info!(
                "Cluster {}: {} symbols, {:.3} bits/symbol",
                cluster,
                distribution.alphabet_size(),
                entropy(distribution.frequencies(), ANS_TAB_SIZE as f64)
            );
        }
    }

    let mut pl = ProgressLogger::default();
    pl.item_name("symbol").expected_updates(Some(args.count));
    pl.start("Decoding symbols...");

    let mut out = BufWriter::new(std::io::stdout().lock());
    for _ in 0..args.count {
        let symbol = stream.read_symbol_with_multiplier(&mut reader, args.context, args.multiplier)?;
        writeln!(out, "{}", symbol)?;
        pl.light_update();
    }
    out.flush()?;
    pl.done();

    if stream.validate_final_state() {
        info!("Final ANS state is valid after {} bits", reader.bits_read());
    } else {
        warn!(
            "Final ANS state {:#x} is not valid: the stream holds more symbols",
            stream.ans_state().get().unwrap_or_default()
        );
    }

    Ok(())
}
