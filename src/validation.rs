//! Static consistency checks for register tables and the mode catalog.
//!
//! These run when the catalog is built so that a defective table or a
//! catalog that disagrees with the board configuration fails at
//! initialization, not when a specific mode is first requested.

use std::collections::HashSet;

use crate::error::{ConfigurationError, TableError};
use crate::modes::ModeDescriptor;
use crate::table::{RegisterEntry, MAX_TABLE_ENTRIES};

/// Validates that a table is terminated by exactly one reachable `END`.
///
/// # Returns
///
/// The index of the `END` entry.
///
/// # Errors
///
/// - `TooLong` if no `END` appears within [`MAX_TABLE_ENTRIES`]
/// - `Unterminated` if the slice ends without `END`
/// - `TrailingEntries` if anything follows `END`
pub fn validate_table(
    table: &'static str,
    entries: &[RegisterEntry],
) -> Result<usize, TableError> {
    let end = entries
        .iter()
        .take(MAX_TABLE_ENTRIES)
        .position(RegisterEntry::is_end);

    let Some(end) = end else {
        if entries.len() > MAX_TABLE_ENTRIES {
            return Err(TableError::TooLong {
                table,
                limit: MAX_TABLE_ENTRIES,
            });
        }
        return Err(TableError::Unterminated { table });
    };

    let trailing = entries.len() - end - 1;
    if trailing > 0 {
        return Err(TableError::TrailingEntries {
            table,
            count: trailing,
        });
    }

    Ok(end)
}

/// Validates the catalog size against the externally asserted mode count.
pub fn validate_mode_count(expected: usize, actual: usize) -> Result<(), ConfigurationError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ConfigurationError::ModeCountMismatch { expected, actual })
    }
}

/// Validates that mode ids are unique and equal to their catalog position.
///
/// The host framework selects modes by position, so a descriptor whose id
/// differs from its index would silently configure the wrong mode.
pub fn validate_mode_ids(modes: &[ModeDescriptor]) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::with_capacity(modes.len());

    for (position, mode) in modes.iter().enumerate() {
        let id = mode.id.get();
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateModeId(id));
        }
        if usize::try_from(id).ok() != Some(position) {
            return Err(ConfigurationError::ModeIdOutOfPlace { id, position });
        }
        if mode.frame_rates.is_empty() {
            return Err(ConfigurationError::NoFrameRates(id));
        }
    }

    Ok(())
}
