//! Sequence engine: pushes a register table to the device.

use embedded_hal::delay::DelayNs;

use crate::error::SequenceError;
use crate::table::{Directive, RegisterTable};
use crate::traits::Transport;

/// Apply `table` to the device through `transport`.
///
/// The table is validated before anything is written; a malformed table
/// leaves the device untouched. Entries are then processed strictly in
/// order: writes go to the transport one register at a time, `WAIT` blocks
/// the calling thread through `delay`, and `END` stops with success.
///
/// # Errors
///
/// - `Malformed` if the table is not terminated by exactly one `END`
/// - `Transport` on the first failed write, carrying the register address.
///   The remaining entries are not attempted and the device register state
///   is undefined until the caller power-cycles it.
pub fn apply<T, D>(table: &RegisterTable, transport: &mut T, delay: &mut D) -> Result<(), SequenceError>
where
    T: Transport + ?Sized,
    D: DelayNs + ?Sized,
{
    let entries = table.reachable()?;
    log::debug!("applying table `{}` ({} entries)", table.name(), entries.len());

    for entry in entries {
        match entry.directive() {
            Directive::Write { address, value } => {
                transport
                    .write(address, value)
                    .map_err(|source| {
                        log::error!(
                            "table `{}`: write {value:#04x} to {address:#06x} failed: {source}",
                            table.name()
                        );
                        SequenceError::Transport {
                            table: table.name(),
                            address,
                            source,
                        }
                    })?;
            }
            Directive::Wait(ms) => delay.delay_ms(ms),
            Directive::End => break,
        }
    }

    Ok(())
}
