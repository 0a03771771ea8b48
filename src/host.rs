//! Mode catalog in V4L2 frame-size and frame-interval vocabulary.

use v4l::frameinterval::{FrameInterval, FrameIntervalEnum};
use v4l::framesize::{Discrete, FrameSize, FrameSizeEnum};
use v4l::{FourCC, Fraction};

use crate::modes::{ModeCatalog, ModeDescriptor};

/// Bayer RGGB 10-bit, the sensor's native output.
pub const PIXEL_FORMAT: [u8; 4] = *b"RG10";

/// One discrete frame size per mode, in catalog order.
pub fn frame_sizes(catalog: &ModeCatalog) -> Vec<FrameSize> {
    catalog
        .descriptors()
        .map(|mode| FrameSize {
            index: mode.id.get(),
            fourcc: FourCC::new(&PIXEL_FORMAT),
            size: FrameSizeEnum::Discrete(Discrete {
                width: mode.width,
                height: mode.height,
            }),
        })
        .collect()
}

/// Frame intervals (1/fps) for a mode, fastest last.
pub fn frame_intervals(mode: &ModeDescriptor) -> Vec<FrameInterval> {
    mode.frame_rates
        .iter()
        .zip(0u32..)
        .map(|(&fps, index)| FrameInterval {
            index,
            fourcc: FourCC::new(&PIXEL_FORMAT),
            width: mode.width,
            height: mode.height,
            interval: FrameIntervalEnum::Discrete(Fraction::new(1, fps)),
        })
        .collect()
}
