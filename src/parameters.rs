//! Parameters record decoding.
//!
//! Reference: [Parameters](https://github.com/actigraph/GT3X-File-Format/blob/master/LogRecords/Parameters.md)
use serde::{Deserialize, Serialize};

/// Parameter value indicating a magnitude too large to represent.
pub const ENCODED_MAXIMUM: u32 = 0x007F_FFFF;
/// Parameter value indicating a negative magnitude too large to represent.
pub const ENCODED_MINIMUM: u32 = 0x0080_0000;
const SIGNIFICAND_MASK: u32 = 0x00FF_FFFF;
const SIGNIFICAND_SCALE: f64 = 8_388_608.0; // 2^23

/// Keys in the device address space (0) that carry vendor float values.
///
/// There is no way to derive this from the encoding itself; it comes from the vendor's
/// parameter table.
pub const FLOAT_KEYS: [u16; 5] = [49, 51, 55, 57, 58];

/// Address space holding device attributes
pub const ADDRESS_DEVICE: u16 = 0;
/// Address space holding clock configuration
pub const ADDRESS_CLOCK: u16 = 1;
/// Clock key holding the start time, seconds since the Unix epoch.
pub const KEY_START_TIME: u16 = 12;

/// A single key/value pair from a Parameters record.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub address: u16,
    pub key: u16,
    pub value: u32,
}

/// The meaning assigned to a [Parameter].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ParameterValue {
    StartTime(u32),
    Float(f64),
    Other(u32),
}

impl Parameter {
    /// Size of an encoded parameter in bytes
    pub const LEN: usize = 8;

    /// Decode from bytes. Returns `None` if there are not enough bytes.
    #[must_use]
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < Self::LEN {
            return None;
        }
        Some(Parameter {
            address: u16::from_le_bytes([buf[0], buf[1]]),
            key: u16::from_le_bytes([buf[2], buf[3]]),
            value: u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    #[must_use]
    pub fn interpret(&self) -> ParameterValue {
        match (self.address, self.key) {
            (ADDRESS_CLOCK, KEY_START_TIME) => ParameterValue::StartTime(self.value),
            (ADDRESS_DEVICE, key) if FLOAT_KEYS.contains(&key) => {
                ParameterValue::Float(decode_float(self.value))
            }
            _ => ParameterValue::Other(self.value),
        }
    }
}

/// Iterate over the parameters in a Parameters payload.
///
/// Trailing bytes that do not make up a full parameter are ignored.
pub fn decode_parameters(payload: &[u8]) -> impl Iterator<Item = Parameter> + '_ {
    payload
        .chunks_exact(Parameter::LEN)
        .filter_map(Parameter::decode)
}

/// Decode a parameter value using the vendor float encoding.
///
/// The top 8 bits are a signed exponent and the low 24 bits a signed significand with
/// 23 fractional bits. [ENCODED_MAXIMUM] and [ENCODED_MINIMUM] are reserved for values
/// out of range and decode to `f64::MAX` and `-f64::MAX`.
#[must_use]
pub fn decode_float(value: u32) -> f64 {
    if value == ENCODED_MAXIMUM {
        return f64::MAX;
    }
    if value == ENCODED_MINIMUM {
        return -f64::MAX;
    }

    let exponent = i32::from((value >> 24) as u8 as i8);

    let mut significand = value & SIGNIFICAND_MASK;
    if significand & ENCODED_MINIMUM != 0 {
        significand |= !SIGNIFICAND_MASK;
    }
    let significand = f64::from(significand as i32) / SIGNIFICAND_SCALE;

    significand * 2f64.powi(exponent)
}
