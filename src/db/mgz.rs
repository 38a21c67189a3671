//! Blocked gzip: fixed-size blocks each independently deflated with a
//! full gzip header, so the concatenation is itself a valid gzip
//! stream (spec.md §4.G, grounded on `original_source/mgz.c`).
//!
//! The original parallelizes block compression with OpenMP; here each
//! block is compressed independently via `rayon`'s `par_chunks`, which
//! is the same "split work by block, no shared mutable state" shape.

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rayon::prelude::*;
use std::io::{Read, Write};

/// Decompressed bytes per block. Only the last block may be shorter.
pub const BLOCK_SIZE: usize = 1 << 20;

/// Compress `data` into independently-deflated 1 MiB blocks,
/// concatenated. Returns the compressed bytes and the prefix-sum
/// offsets (`offsets[0] == 0`, `offsets[offsets.len()-1] ==
/// compressed.len()`), one more entry than there are blocks.
pub fn compress(data: &[u8], level: Compression) -> (Vec<u8>, Vec<u64>) {
    let blocks: Vec<Vec<u8>> = data
        .par_chunks(BLOCK_SIZE)
        .map(|chunk| {
            let mut encoder = GzEncoder::new(Vec::new(), level);
            encoder.write_all(chunk).expect("in-memory gzip write cannot fail");
            encoder.finish().expect("in-memory gzip finish cannot fail")
        })
        .collect();

    let mut compressed = Vec::with_capacity(blocks.iter().map(Vec::len).sum());
    let mut offsets = Vec::with_capacity(blocks.len() + 1);
    offsets.push(0u64);
    for block in &blocks {
        compressed.extend_from_slice(block);
        offsets.push(compressed.len() as u64);
    }
    (compressed, offsets)
}

/// Decompress a full blocked-gzip stream sequentially. Valid because a
/// concatenation of independent gzip members decodes as a single
/// multistream.
pub fn decompress_all(compressed: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = flate2::read::MultiGzDecoder::new(compressed);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Decompress only the block spanning `offsets[index]..offsets[index
/// + 1]`, for a seeked single-cell read.
pub fn decompress_block(compressed: &[u8], offsets: &[u64], index: usize) -> std::io::Result<Vec<u8>> {
    let start = offsets[index] as usize;
    let end = offsets[index + 1] as usize;
    let mut decoder = GzDecoder::new(&compressed[start..end]);
    let mut out = Vec::with_capacity(BLOCK_SIZE);
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Which block holds decompressed byte `byte_offset`, given the
/// uniform block size (the last block may be short, but it is always
/// last, so this search only needs the offsets count, not each
/// block's decompressed length).
pub fn block_for_byte(byte_offset: usize) -> usize {
    byte_offset / BLOCK_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_small_input() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(100);
        let (compressed, offsets) = compress(&data, Compression::default());
        let restored = decompress_all(&compressed).unwrap();
        assert_eq!(restored, data);
        assert_eq!(offsets[0], 0);
        assert_eq!(*offsets.last().unwrap(), compressed.len() as u64);
    }

    #[test]
    fn seeked_block_matches_sequential_read() {
        let data: Vec<u8> = (0..(BLOCK_SIZE * 3 + 123)).map(|i| (i % 251) as u8).collect();
        let (compressed, offsets) = compress(&data, Compression::fast());
        let block_index = block_for_byte(BLOCK_SIZE + 5);
        let block = decompress_block(&compressed, &offsets, block_index).unwrap();
        assert_eq!(block, &data[BLOCK_SIZE..(2 * BLOCK_SIZE).min(data.len())]);
    }
}
