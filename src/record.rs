//! Log record framing.
//!
//! Reference: [GT3X File Format](https://github.com/actigraph/GT3X-File-Format)
use std::collections::HashMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Byte marking the start of every log record.
pub const SEPARATOR: u8 = 0x1E;

/// Record type codes found in `log.bin`.
///
/// Only [RecordType::Parameters], [RecordType::Activity] and [RecordType::Activity2] are
/// decoded; all others are valid records whose payloads are skipped. Codes not known at
/// the time of writing are carried by [RecordType::Unknown] and are skipped as well.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// One second of activity samples packed into 12-bit values.
    Activity,
    /// Battery voltage in millivolts.
    Battery,
    /// Internal debugging event.
    Event,
    /// Heart rate average beats per minute.
    HeartRateBpm,
    Lux,
    /// Arbitrary metadata, JSON subject data in the first record of a log.
    Metadata,
    Tag,
    Epoch,
    /// Heart rate RR information from an ANT+ sensor.
    HeartRateAnt,
    Epoch2,
    Capsense,
    /// Bluetooth heart rate (BPM and RR).
    HeartRateBle,
    Epoch3,
    Epoch4,
    /// Device configuration parameters, written on initialization.
    Parameters,
    SensorSchema,
    SensorData,
    /// One second of activity samples as little-endian `i16`s.
    Activity2,
    Unknown(u8),
}

impl From<u8> for RecordType {
    fn from(code: u8) -> Self {
        match code {
            0x00 => Self::Activity,
            0x02 => Self::Battery,
            0x03 => Self::Event,
            0x04 => Self::HeartRateBpm,
            0x05 => Self::Lux,
            0x06 => Self::Metadata,
            0x07 => Self::Tag,
            0x09 => Self::Epoch,
            0x0B => Self::HeartRateAnt,
            0x0C => Self::Epoch2,
            0x0D => Self::Capsense,
            0x0E => Self::HeartRateBle,
            0x0F => Self::Epoch3,
            0x10 => Self::Epoch4,
            0x15 => Self::Parameters,
            0x18 => Self::SensorSchema,
            0x19 => Self::SensorData,
            0x1A => Self::Activity2,
            code => Self::Unknown(code),
        }
    }
}

impl From<RecordType> for u8 {
    fn from(typ: RecordType) -> Self {
        match typ {
            RecordType::Activity => 0x00,
            RecordType::Battery => 0x02,
            RecordType::Event => 0x03,
            RecordType::HeartRateBpm => 0x04,
            RecordType::Lux => 0x05,
            RecordType::Metadata => 0x06,
            RecordType::Tag => 0x07,
            RecordType::Epoch => 0x09,
            RecordType::HeartRateAnt => 0x0B,
            RecordType::Epoch2 => 0x0C,
            RecordType::Capsense => 0x0D,
            RecordType::HeartRateBle => 0x0E,
            RecordType::Epoch3 => 0x0F,
            RecordType::Epoch4 => 0x10,
            RecordType::Parameters => 0x15,
            RecordType::SensorSchema => 0x18,
            RecordType::SensorData => 0x19,
            RecordType::Activity2 => 0x1A,
            RecordType::Unknown(code) => code,
        }
    }
}

impl Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "Unknown(0x{code:02x})"),
            typ => write!(f, "{typ:?}"),
        }
    }
}

impl RecordType {
    /// Number of sample rows a payload of `len` bytes holds for this record type.
    ///
    /// Non-activity records never hold samples.
    #[must_use]
    pub fn sample_count(&self, len: u16) -> usize {
        let len = usize::from(len);
        match self {
            Self::Activity => len * 2 / 9,
            Self::Activity2 => len / 2 / 3,
            _ => 0,
        }
    }
}

/// Header following every [SEPARATOR].
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub record_type: RecordType,
    /// Start of the payload, seconds since the Unix epoch.
    pub timestamp: u32,
    /// Number of payload bytes following the header.
    pub payload_len: u16,
}

impl RecordHeader {
    /// Size of a ``RecordHeader``, not including the separator.
    pub const LEN: usize = 7;

    /// Decode from bytes. Returns `None` if there are not enough bytes to construct the
    /// header.
    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(RecordHeader {
            record_type: RecordType::from(buf[0]),
            timestamp: u32::from_le_bytes([buf[1], buf[2], buf[3], buf[4]]),
            payload_len: u16::from_le_bytes([buf[5], buf[6]]),
        })
    }

    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.record_type.sample_count(self.payload_len)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RecordTypeSummary {
    pub count: usize,
    pub bytes: usize,
}

/// Tracks stats over a single pass of a log stream.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of records framed, whether decoded or skipped.
    pub records: usize,
    /// Total payload bytes of all framed records.
    pub bytes: usize,
    pub record_types: HashMap<RecordType, RecordTypeSummary>,
    /// Number of times a byte other than [SEPARATOR] was found where a record should
    /// have started.
    pub desync_events: usize,
    /// Number of bytes skipped while resynchronizing.
    pub desync_bytes: usize,
    /// True when the pass stopped early because the sample capacity was exhausted.
    pub truncated: bool,
}

impl Summary {
    pub fn add(&mut self, header: &RecordHeader) {
        let len = usize::from(header.payload_len);
        self.records += 1;
        self.bytes += len;

        let typ = self.record_types.entry(header.record_type).or_default();
        typ.count += 1;
        typ.bytes += len;
    }

    /// Number of records seen of type `typ`.
    #[must_use]
    pub fn count(&self, typ: RecordType) -> usize {
        self.record_types.get(&typ).map_or(0, |s| s.count)
    }
}
