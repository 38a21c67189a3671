//! The `.stat` sidecar: per-tier solve statistics, and the commit
//! marker that tells a re-run whether the tier actually finished
//! (spec.md §4.F S6, §6).

use crate::error::{Result, SolverError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Fixed on-disk layout: eight `u64` fields (spec.md §6). A `.stat`
/// file of any other size is corrupted, not merely outdated.
pub const ENCODED_LEN: usize = 8 * 8;

/// Per-tier solve statistics. `longest_win_*` tracks the single
/// deepest WIN found for each side during propagation (S4 updates
/// these only for positions that belong to the tier being solved, not
/// imported child-tier entries, per spec.md §4.F).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub legal_count: u64,
    pub win_count: u64,
    pub lose_count: u64,
    pub draw_count: u64,
    pub longest_win_remoteness_red: u64,
    pub longest_win_position_red: u64,
    pub longest_win_remoteness_black: u64,
    pub longest_win_position_black: u64,
}

impl Stats {
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_u64::<LittleEndian>(self.legal_count)?;
        writer.write_u64::<LittleEndian>(self.win_count)?;
        writer.write_u64::<LittleEndian>(self.lose_count)?;
        writer.write_u64::<LittleEndian>(self.draw_count)?;
        writer.write_u64::<LittleEndian>(self.longest_win_remoteness_red)?;
        writer.write_u64::<LittleEndian>(self.longest_win_position_red)?;
        writer.write_u64::<LittleEndian>(self.longest_win_remoteness_black)?;
        writer.write_u64::<LittleEndian>(self.longest_win_position_black)?;
        Ok(())
    }

    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Stats {
            legal_count: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            win_count: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            lose_count: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            draw_count: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            longest_win_remoteness_red: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            longest_win_position_red: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            longest_win_remoteness_black: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
            longest_win_position_black: reader.read_u64::<LittleEndian>().map_err(SolverError::Io)?,
        })
    }

    pub fn validate_len(tier_name: &str, found: usize) -> Result<()> {
        if found != ENCODED_LEN {
            return Err(SolverError::StatCorrupted {
                tier: tier_name.to_string(),
                expected: ENCODED_LEN,
                found,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let stats = Stats {
            legal_count: 900,
            win_count: 300,
            lose_count: 200,
            draw_count: 400,
            longest_win_remoteness_red: 17,
            longest_win_position_red: 42,
            longest_win_remoteness_black: 9,
            longest_win_position_black: 7,
        };
        let mut buf = Vec::new();
        stats.write(&mut buf).unwrap();
        assert_eq!(buf.len(), ENCODED_LEN);
        let restored = Stats::read(&mut buf.as_slice()).unwrap();
        assert_eq!(restored, stats);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Stats::validate_len("t", ENCODED_LEN - 1).is_err());
        assert!(Stats::validate_len("t", ENCODED_LEN).is_ok());
    }
}
