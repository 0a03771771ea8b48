//! Register tables for the IMX219 sensor on the OVC4 camera module.

use crate::error::ConfigurationError;
use crate::modes::{ModeCatalog, ModeDescriptor};
use crate::table::{RegisterEntry, RegisterTable};

const fn w(address: u16, value: u8) -> RegisterEntry {
    RegisterEntry::write(address, value)
}

static START_STREAM: [RegisterEntry; 3] = [
    w(0x0100, 0x01),
    RegisterEntry::wait_ms(3),
    RegisterEntry::end(),
];

static STOP_STREAM: [RegisterEntry; 2] = [w(0x0100, 0x00), RegisterEntry::end()];

static MODE_COMMON: [RegisterEntry; 25] = [
    RegisterEntry::wait_ms(10),
    // software reset
    w(0x0103, 0x01),
    // D-PHY 2-lane, 24 MHz INCK
    w(0x0114, 0x01),
    w(0x0128, 0x00),
    w(0x012A, 0x18),
    w(0x012B, 0x00),
    // vendor register access code
    w(0x30EB, 0x05),
    w(0x30EB, 0x0C),
    w(0x300A, 0xFF),
    w(0x300B, 0xFF),
    w(0x30EB, 0x05),
    w(0x30EB, 0x09),
    // CIS tuning
    w(0x455E, 0x00),
    w(0x471E, 0x4B),
    w(0x4767, 0x0F),
    w(0x4750, 0x14),
    w(0x4540, 0x00),
    w(0x47B4, 0x14),
    w(0x4713, 0x30),
    w(0x478B, 0x10),
    w(0x478F, 0x10),
    w(0x4793, 0x10),
    w(0x4797, 0x0E),
    w(0x479B, 0x0E),
    RegisterEntry::end(),
];

static MODE_3264X2464_21FPS: [RegisterEntry; 42] = [
    // capture: ANALOG_GAIN_GLOBAL, COARSE_INTEG_TIME
    w(0x0157, 0x00),
    w(0x015A, 0x09),
    w(0x015B, 0xBD),
    // FRM_LENGTH, LINE_LENGTH
    w(0x0160, 0x09),
    w(0x0161, 0xC1),
    w(0x0162, 0x0D),
    w(0x0163, 0x78),
    // crop window and output size
    w(0x0164, 0x00),
    w(0x0165, 0x08),
    w(0x0166, 0x0C),
    w(0x0167, 0xC7),
    w(0x0168, 0x00),
    w(0x0169, 0x00),
    w(0x016A, 0x09),
    w(0x016B, 0x9F),
    w(0x016C, 0x0C),
    w(0x016D, 0xC0),
    w(0x016E, 0x09),
    w(0x016F, 0xA0),
    w(0x0170, 0x01),
    w(0x0171, 0x01),
    w(0x0174, 0x00),
    w(0x0175, 0x00),
    w(0x018C, 0x0A),
    w(0x018D, 0x0A),
    w(0x0264, 0x00),
    w(0x0265, 0x08),
    w(0x0266, 0x0C),
    w(0x0267, 0xC7),
    w(0x026C, 0x0C),
    w(0x026D, 0xC0),
    // clock dividers
    w(0x0301, 0x05),
    w(0x0303, 0x01),
    w(0x0304, 0x03),
    w(0x0305, 0x03),
    w(0x0306, 0x00),
    w(0x0307, 0x39),
    w(0x0309, 0x0A),
    w(0x030B, 0x01),
    w(0x030C, 0x00),
    w(0x030D, 0x72),
    RegisterEntry::end(),
];

/// Stream-on table.
pub static START_STREAM_TABLE: RegisterTable = RegisterTable::new("start_stream", &START_STREAM);
/// Stream-off table.
pub static STOP_STREAM_TABLE: RegisterTable = RegisterTable::new("stop_stream", &STOP_STREAM);
/// Common initialization applied before every mode.
pub static MODE_COMMON_TABLE: RegisterTable = RegisterTable::new("mode_common", &MODE_COMMON);
/// Full-resolution 3264x2464 at 21 fps.
pub static MODE_3264X2464_21FPS_TABLE: RegisterTable =
    RegisterTable::new("mode_3264x2464_21fps", &MODE_3264X2464_21FPS);

/// Build the IMX219 catalog.
///
/// Mode order must match the mode order declared in the board's device
/// tree; `expected_modes` is the count that configuration asserts.
pub fn catalog(expected_modes: usize) -> Result<ModeCatalog, ConfigurationError> {
    ModeCatalog::builder()
        .common(MODE_COMMON_TABLE)
        .start_stream(START_STREAM_TABLE)
        .stop_stream(STOP_STREAM_TABLE)
        .mode(
            ModeDescriptor::new(0, (3264, 2464), &[21]),
            MODE_3264X2464_21FPS_TABLE,
        )
        .build(expected_modes)
}
