//! Out-of-band control channel shared with a userspace consumer.
//!
//! The channel is a single fixed-layout [`ControlRecord`] in a memory
//! mapping. The driver is the only writer; readers map the same region and
//! poll it. There is no lock, handshake or change notification. Each field
//! is updated with one aligned store, but the record as a whole is not
//! updated atomically: a reader may see a new gain paired with an old
//! exposure.

use std::fs::{File, OpenOptions};
use std::io;
use std::mem::size_of;
use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::error::{Result, SensorError};
use crate::identity::UNIDENTIFIED_SENSOR_ID;

/// Prefix of named control regions; the instance id is appended.
pub const REGION_PREFIX: &str = "ovc4cam_ctrl_";

/// The shared record. Field order and widths are a stable ABI.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct ControlRecord {
    /// Last gain written by the host.
    pub gain: i64,
    /// Last exposure written by the host.
    pub exposure: i64,
    /// Index of the identified sensor, or `-1`.
    pub sensor_id: i32,
    reserved: i32,
}

/// Size of the mapped region in bytes.
pub const CONTROL_RECORD_SIZE: usize = size_of::<ControlRecord>();

const _: () = assert!(CONTROL_RECORD_SIZE == 24);

impl ControlRecord {
    /// Record with zero gain/exposure and no identity.
    pub const fn unidentified() -> Self {
        Self {
            gain: 0,
            exposure: 0,
            sensor_id: UNIDENTIFIED_SENSOR_ID,
            reserved: 0,
        }
    }
}

/// File name of the control region for instance `id`.
pub fn region_name(id: u32) -> String {
    format!("{REGION_PREFIX}{id}")
}

/// Writer side of the control channel, owned by one driver instance.
#[derive(Debug)]
pub struct ControlChannel {
    region: MmapMut,
    path: Option<PathBuf>,
}

impl ControlChannel {
    /// Private anonymous mapping, for instances without a userspace reader.
    pub fn anonymous() -> Result<Self> {
        let region = MmapMut::map_anon(CONTROL_RECORD_SIZE).map_err(SensorError::Allocation)?;
        Self::init(region, None)
    }

    /// Named region `dir/ovc4cam_ctrl_<id>`, removed again on drop.
    ///
    /// Fails with `AlreadyExists` if another instance holds the same id.
    pub fn create(dir: &Path, id: u32) -> Result<Self> {
        let path = dir.join(region_name(id));
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|err| {
                log::error!("cannot create control region {}: {err}", path.display());
                SensorError::Allocation(err)
            })?;
        file.set_len(CONTROL_RECORD_SIZE as u64)
            .map_err(SensorError::Allocation)?;

        // SAFETY: the file was just created and sized to one record. This
        // channel is its only writer and other processes map it read-only.
        #[allow(unsafe_code)]
        let region = unsafe { MmapOptions::new().len(CONTROL_RECORD_SIZE).map_mut(&file) }
            .map_err(SensorError::Allocation)?;

        log::debug!("control channel mapped at {}", path.display());
        Self::init(region, Some(path))
    }

    fn init(region: MmapMut, path: Option<PathBuf>) -> Result<Self> {
        let mut channel = Self { region, path };
        *channel.record_mut()? = ControlRecord::unidentified();
        Ok(channel)
    }

    /// Path of the named region, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Last-writer-wins gain update.
    pub fn set_gain(&mut self, value: i64) -> Result<()> {
        self.record_mut()?.gain = value;
        Ok(())
    }

    /// Last-writer-wins exposure update.
    pub fn set_exposure(&mut self, value: i64) -> Result<()> {
        self.record_mut()?.exposure = value;
        Ok(())
    }

    /// Publish the resolved sensor id; `-1` for an unidentified sensor.
    pub fn publish_identity(&mut self, sensor_id: i32) -> Result<()> {
        self.record_mut()?.sensor_id = sensor_id;
        Ok(())
    }

    /// Current contents as seen by this writer.
    pub fn snapshot(&self) -> Result<ControlRecord> {
        read_record(&self.region)
    }

    fn record_mut(&mut self) -> Result<&mut ControlRecord> {
        self.region
            .get_mut(..CONTROL_RECORD_SIZE)
            .and_then(|bytes| bytemuck::try_from_bytes_mut(bytes).ok())
            .ok_or_else(region_gone)
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        if let Some(path) = &self.path {
            if let Err(err) = std::fs::remove_file(path) {
                log::warn!("failed to remove control region {}: {err}", path.display());
            }
        }
    }
}

/// Read-only view of a named control region.
#[derive(Debug)]
pub struct ControlReader {
    region: Mmap,
}

impl ControlReader {
    /// Map an existing region.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(SensorError::Allocation)?;
        let len = file.metadata().map_err(SensorError::Allocation)?.len();
        if len < CONTROL_RECORD_SIZE as u64 {
            return Err(region_gone());
        }

        // SAFETY: read-only mapping of a region whose size was checked above;
        // the writer never shrinks it while mapped.
        #[allow(unsafe_code)]
        let region = unsafe { MmapOptions::new().len(CONTROL_RECORD_SIZE).map(&file) }
            .map_err(SensorError::Allocation)?;

        Ok(Self { region })
    }

    /// Copy of the record. Fields may come from different updates.
    pub fn snapshot(&self) -> Result<ControlRecord> {
        read_record(&self.region)
    }
}

fn read_record(bytes: &[u8]) -> Result<ControlRecord> {
    bytes
        .get(..CONTROL_RECORD_SIZE)
        .map(bytemuck::pod_read_unaligned)
        .ok_or_else(region_gone)
}

fn region_gone() -> SensorError {
    SensorError::Allocation(io::Error::new(
        io::ErrorKind::UnexpectedEof,
        "control region is smaller than one record",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn test_record_layout() {
        assert_eq!(offset_of!(ControlRecord, gain), 0);
        assert_eq!(offset_of!(ControlRecord, exposure), 8);
        assert_eq!(offset_of!(ControlRecord, sensor_id), 16);
        assert_eq!(CONTROL_RECORD_SIZE, 24);
    }

    #[test]
    fn test_anonymous_channel_starts_unidentified() {
        let channel = ControlChannel::anonymous().expect("anonymous mapping should succeed");
        assert_eq!(
            channel.snapshot().expect("snapshot should succeed"),
            ControlRecord::unidentified()
        );
        assert!(channel.path().is_none());
    }

    #[test]
    fn test_gain_is_independent_of_exposure() {
        let mut channel = ControlChannel::anonymous().expect("anonymous mapping should succeed");

        channel.set_gain(128).expect("set_gain should succeed");
        channel.set_exposure(33_000).expect("set_exposure should succeed");
        channel.set_exposure(16_000).expect("set_exposure should succeed");

        let record = channel.snapshot().expect("snapshot should succeed");
        assert_eq!(record.gain, 128);
        assert_eq!(record.exposure, 16_000);
    }

    #[test]
    fn test_named_region_visible_to_reader() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut channel = ControlChannel::create(dir.path(), 3).expect("create should succeed");
        let path = channel.path().expect("named region has a path").to_path_buf();
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("ovc4cam_ctrl_3"));

        let reader = ControlReader::open(&path).expect("reader should map region");
        channel.publish_identity(0).expect("publish should succeed");
        channel.set_gain(64).expect("set_gain should succeed");

        let record = reader.snapshot().expect("snapshot should succeed");
        assert_eq!(record.sensor_id, 0);
        assert_eq!(record.gain, 64);
        assert_eq!(record.exposure, 0);
    }

    #[test]
    fn test_named_region_removed_on_drop() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let channel = ControlChannel::create(dir.path(), 0).expect("create should succeed");
        let path = channel.path().expect("named region has a path").to_path_buf();
        assert!(path.exists());

        drop(channel);
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_id_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let mut first = ControlChannel::create(dir.path(), 2).expect("create should succeed");
        first.set_gain(96).expect("set_gain should succeed");

        let second = ControlChannel::create(dir.path(), 2);
        assert!(matches!(
            second,
            Err(SensorError::Allocation(ref err)) if err.kind() == io::ErrorKind::AlreadyExists
        ));

        let path = first.path().expect("named region has a path");
        assert!(path.exists());
        let reader = ControlReader::open(path).expect("reader should map region");
        assert_eq!(reader.snapshot().expect("snapshot should succeed").gain, 96);
    }

    #[test]
    fn test_reader_rejects_short_region() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("short");
        std::fs::write(&path, [0u8; 8]).expect("write should succeed");

        assert!(matches!(
            ControlReader::open(&path),
            Err(SensorError::Allocation(_))
        ));
    }
}
