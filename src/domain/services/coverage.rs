//! Roll coverage rules for encounter table entries
//!
//! A well-formed entry set tiles `[1, die_size]` exactly: sorted by
//! `roll_min`, the first range starts at 1, each range starts one past the
//! previous range's end, and the last range ends at `die_size`.

use thiserror::Error;

use crate::domain::entities::EncounterTableEntry;
use crate::domain::value_objects::DieSize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverageError {
    #[error("table has no entries")]
    Empty,
    #[error("entry {roll_min}-{roll_max} has an inverted range")]
    InvertedRange { roll_min: u32, roll_max: u32 },
    #[error("rolls {from}-{to} are not covered by any entry")]
    Gap { from: u32, to: u32 },
    #[error("roll {roll} is covered by more than one entry")]
    Overlap { roll: u32 },
    #[error("entry ends at {roll_max}, past the last face {die_size}")]
    Overrun { roll_max: u32, die_size: u32 },
    #[error("entries stop at {last}, short of the last face {die_size}")]
    Incomplete { last: u32, die_size: u32 },
}

/// Check that `entries` (in any order) cover every face of `die` exactly once.
pub fn verify_coverage(die: DieSize, entries: &[EncounterTableEntry]) -> Result<(), CoverageError> {
    if entries.is_empty() {
        return Err(CoverageError::Empty);
    }

    let mut ranges: Vec<(u32, u32)> = entries.iter().map(|e| (e.roll_min, e.roll_max)).collect();
    ranges.sort_unstable();

    let die_size = die.get();
    let mut next = 1u32;
    for (roll_min, roll_max) in ranges {
        if roll_min > roll_max {
            return Err(CoverageError::InvertedRange { roll_min, roll_max });
        }
        if roll_min > next {
            return Err(CoverageError::Gap {
                from: next,
                to: roll_min - 1,
            });
        }
        if roll_min < next {
            return Err(CoverageError::Overlap { roll: roll_min });
        }
        if roll_max > die_size {
            return Err(CoverageError::Overrun { roll_max, die_size });
        }
        next = roll_max + 1;
    }

    if next <= die_size {
        return Err(CoverageError::Incomplete {
            last: next - 1,
            die_size,
        });
    }
    Ok(())
}

/// Entry whose range contains `roll`. `entries` must be sorted by `roll_min`.
pub fn find_entry(entries: &[EncounterTableEntry], roll: u32) -> Option<&EncounterTableEntry> {
    let idx = entries.partition_point(|e| e.roll_max < roll);
    entries.get(idx).filter(|e| e.contains(roll))
}

/// Merge runs of consecutive entries that reference the same monster and
/// renumber the result 1..n. Input must be sorted by `roll_min`.
pub fn compact_ranges(entries: Vec<EncounterTableEntry>) -> Vec<EncounterTableEntry> {
    let mut merged: Vec<EncounterTableEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        match merged.last_mut() {
            Some(last)
                if last.monster_id.is_some()
                    && last.monster_id == entry.monster_id
                    && last.roll_max + 1 == entry.roll_min =>
            {
                last.roll_max = entry.roll_max;
            }
            _ => merged.push(entry),
        }
    }
    for (idx, entry) in merged.iter_mut().enumerate() {
        entry.roll_number = idx as u32 + 1;
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Monster;
    use crate::domain::value_objects::TableId;

    fn entries(ranges: &[(u32, u32)]) -> Vec<EncounterTableEntry> {
        let goblin = Monster::official("Goblin", 1);
        let table_id = TableId::new();
        ranges
            .iter()
            .enumerate()
            .map(|(i, &(min, max))| {
                EncounterTableEntry::ranged(table_id, i as u32 + 1, min, max, &goblin)
            })
            .collect()
    }

    fn d(n: u32) -> DieSize {
        DieSize::new(n).unwrap()
    }

    #[test]
    fn test_exact_tiling_passes() {
        assert!(verify_coverage(d(6), &entries(&[(1, 2), (3, 3), (4, 6)])).is_ok());
        // order does not matter
        assert!(verify_coverage(d(4), &entries(&[(3, 4), (1, 2)])).is_ok());
    }

    #[test]
    fn test_violations_detected() {
        assert_eq!(verify_coverage(d(4), &[]), Err(CoverageError::Empty));
        assert_eq!(
            verify_coverage(d(6), &entries(&[(1, 2), (4, 6)])),
            Err(CoverageError::Gap { from: 3, to: 3 })
        );
        assert_eq!(
            verify_coverage(d(6), &entries(&[(1, 3), (3, 6)])),
            Err(CoverageError::Overlap { roll: 3 })
        );
        assert_eq!(
            verify_coverage(d(6), &entries(&[(1, 4)])),
            Err(CoverageError::Incomplete { last: 4, die_size: 6 })
        );
        assert_eq!(
            verify_coverage(d(4), &entries(&[(1, 5)])),
            Err(CoverageError::Overrun { roll_max: 5, die_size: 4 })
        );
        assert_eq!(
            verify_coverage(d(4), &entries(&[(2, 1)])),
            Err(CoverageError::InvertedRange { roll_min: 2, roll_max: 1 })
        );
        assert_eq!(
            verify_coverage(d(4), &entries(&[(2, 4)])),
            Err(CoverageError::Gap { from: 1, to: 1 })
        );
    }

    #[test]
    fn test_find_entry() {
        let set = entries(&[(1, 2), (3, 3), (4, 6)]);
        assert_eq!(find_entry(&set, 1).map(|e| e.roll_number), Some(1));
        assert_eq!(find_entry(&set, 2).map(|e| e.roll_number), Some(1));
        assert_eq!(find_entry(&set, 3).map(|e| e.roll_number), Some(2));
        assert_eq!(find_entry(&set, 6).map(|e| e.roll_number), Some(3));
        assert!(find_entry(&set, 7).is_none());
        assert!(find_entry(&set, 0).is_none());
    }

    #[test]
    fn test_compact_merges_adjacent_duplicates() {
        let table_id = TableId::new();
        let goblin = Monster::official("Goblin", 1);
        let orc = Monster::official("Orc", 2);
        let picks = [&goblin, &goblin, &orc, &goblin, &goblin, &goblin];
        let singles: Vec<_> = picks
            .iter()
            .enumerate()
            .map(|(i, m)| EncounterTableEntry::single(table_id, i as u32 + 1, m))
            .collect();

        let merged = compact_ranges(singles);
        let layout: Vec<_> = merged
            .iter()
            .map(|e| (e.roll_number, e.roll_min, e.roll_max, e.monster.name.as_str()))
            .collect();
        assert_eq!(
            layout,
            vec![(1, 1, 2, "Goblin"), (2, 3, 3, "Orc"), (3, 4, 6, "Goblin")]
        );
        assert!(verify_coverage(d(6), &merged).is_ok());
    }
}
