use std::fs::File;
use std::io::BufWriter;

use dsi_bitstream::impls::{BufBitWriter, WordAdapter};
use dsi_bitstream::traits::{BitWrite, LE};
use rand::prelude::SmallRng;
use rand::{RngCore, SeedableRng};
use tempfile::NamedTempFile;

pub mod decoder;
pub mod header;

/// Number of symbols decoded by each decoding benchmark.
const NUM_SYMBOLS: usize = 1_000_000;

/// Random 32-bit words following the header, more than any benchmark consumes.
const PAYLOAD_WORDS: usize = 1 << 20;

type Writer = BufBitWriter<LE, WordAdapter<u32, BufWriter<File>>>;

/// Writes a stream header followed by random payload bits, which any complete
/// code decodes to some symbol sequence.
fn stream_bytes(header: impl FnOnce(&mut Writer) -> anyhow::Result<()>) -> anyhow::Result<Vec<u8>> {
    let file = NamedTempFile::new()?;
    let mut writer: Writer = BufBitWriter::new(WordAdapter::new(BufWriter::new(file.reopen()?)));
    header(&mut writer)?;

    let mut rng = SmallRng::seed_from_u64(0);
    for _ in 0..PAYLOAD_WORDS {
        writer.write_bits(rng.next_u32() as u64, 32)?;
    }
    writer.flush()?;
    drop(writer);

    Ok(std::fs::read(file.path())?)
}

/// Writes a `U8` field.
fn write_u8(writer: &mut Writer, value: u32) -> anyhow::Result<()> {
    if value == 0 {
        writer.write_bits(0, 1)?;
        return Ok(());
    }
    let width = value.ilog2();
    writer.write_bits(1, 1)?;
    writer.write_bits(width as u64, 3)?;
    if width > 0 {
        writer.write_bits((value - (1 << width)) as u64, width as usize)?;
    }
    Ok(())
}

/// Writes the header of an ANS stream of `num_clusters` (at most 8) flat clusters
/// over `alphabet_size` symbols (at most 139, so that every token expands to at
/// most 32 extra bits), one context per cluster.
fn flat_ans_header(writer: &mut Writer, num_clusters: usize, alphabet_size: u32) -> anyhow::Result<()> {
    // no LZ77
    writer.write_bits(0, 1)?;
    if num_clusters > 1 {
        // simple cluster map, three bits per context
        writer.write_bits(1, 1)?;
        writer.write_bits(3, 2)?;
        for cluster in 0..num_clusters {
            writer.write_bits(cluster as u64, 3)?;
        }
    }
    // ANS with 256-entry tables
    writer.write_bits(0, 1)?;
    writer.write_bits(3, 2)?;
    for _ in 0..num_clusters {
        // split exponent 4, 1 msb and 1 lsb in the token
        writer.write_bits(4, 4)?;
        writer.write_bits(1, 3)?;
        writer.write_bits(1, 2)?;
    }
    for _ in 0..num_clusters {
        writer.write_bits(0, 1)?;
        writer.write_bits(1, 1)?;
        write_u8(writer, alphabet_size - 1)?;
    }
    Ok(())
}
