//! The `.lookup` sidecar: a block count followed by the prefix-sum
//! array of compressed block offsets, letting a single-cell read
//! binary-search to the containing block (spec.md §4.G).

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Write `offsets` (as produced by [`super::mgz::compress`]) to
/// `writer`: block count, then each offset, little-endian `u64`.
pub fn write<W: Write>(writer: &mut W, offsets: &[u64]) -> std::io::Result<()> {
    let block_count = (offsets.len() - 1) as u64;
    writer.write_u64::<LittleEndian>(block_count)?;
    for &offset in offsets {
        writer.write_u64::<LittleEndian>(offset)?;
    }
    Ok(())
}

pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Vec<u64>> {
    let block_count = reader.read_u64::<LittleEndian>()?;
    let mut offsets = Vec::with_capacity(block_count as usize + 1);
    for _ in 0..=block_count {
        offsets.push(reader.read_u64::<LittleEndian>()?);
    }
    Ok(offsets)
}

/// `O(log N)` binary search over the prefix-sum array for the block
/// containing decompressed byte `byte_offset`, given each block's
/// fixed decompressed size (the last block may be short, but it's
/// always last).
pub fn block_index_for(block_size: usize, byte_offset: usize) -> usize {
    byte_offset / block_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let offsets = vec![0u64, 1048576, 2097152, 2097999];
        let mut buf = Vec::new();
        write(&mut buf, &offsets).unwrap();
        let restored = read(&mut buf.as_slice()).unwrap();
        assert_eq!(restored, offsets);
    }
}
