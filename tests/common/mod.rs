#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

pub const SEPARATOR: u8 = 0x1E;
pub const PARAMETERS: u8 = 0x15;
pub const ACTIVITY: u8 = 0x00;
pub const ACTIVITY2: u8 = 0x1A;
pub const BATTERY: u8 = 0x02;
pub const METADATA: u8 = 0x06;

/// Builds a `log.bin` record stream.
#[derive(Default)]
pub struct LogBuilder {
    dat: Vec<u8>,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(mut self, typ: u8, timestamp: u32, payload: &[u8]) -> Self {
        self.dat.push(SEPARATOR);
        self.dat.push(typ);
        self.dat.extend_from_slice(&timestamp.to_le_bytes());
        let len = u16::try_from(payload.len()).expect("payload too long");
        self.dat.extend_from_slice(&len.to_le_bytes());
        self.dat.extend_from_slice(payload);
        // checksum, never validated
        self.dat.push(0xFF);
        self
    }

    pub fn parameters(self, timestamp: u32, params: &[(u16, u16, u32)]) -> Self {
        let mut payload = Vec::new();
        for (address, key, value) in params {
            payload.extend_from_slice(&address.to_le_bytes());
            payload.extend_from_slice(&key.to_le_bytes());
            payload.extend_from_slice(&value.to_le_bytes());
        }
        self.record(PARAMETERS, timestamp, &payload)
    }

    pub fn start_time(self, start_time: u32) -> Self {
        self.parameters(start_time, &[(1, 12, start_time)])
    }

    /// One second of samples in the 12-bit packed layout.
    pub fn activity(self, timestamp: u32, samples: &[[i16; 3]]) -> Self {
        let values: Vec<i16> = samples.concat();
        self.record(ACTIVITY, timestamp, &pack12(&values))
    }

    /// One second of samples as little-endian `i16`s.
    pub fn activity2(self, timestamp: u32, samples: &[[i16; 3]]) -> Self {
        let payload: Vec<u8> = samples
            .iter()
            .flatten()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        self.record(ACTIVITY2, timestamp, &payload)
    }

    pub fn raw(mut self, dat: &[u8]) -> Self {
        self.dat.extend_from_slice(dat);
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.dat
    }

    /// Write the stream to a temporary file.
    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("failed to create temp file");
        file.write_all(&self.dat).expect("failed to write log");
        file.flush().expect("failed to flush log");
        file
    }
}

/// Pack values using the 12-bit layout.
pub fn pack12(values: &[i16]) -> Vec<u8> {
    let mut out = Vec::new();
    for pair in values.chunks(2) {
        let a = (pair[0] as u16) & 0x0FFF;
        let b = pair.get(1).map_or(0, |v| (*v as u16) & 0x0FFF);
        out.push((a >> 4) as u8);
        out.push((((a & 0x0F) << 4) | (b >> 8)) as u8);
        if pair.len() == 2 {
            out.push((b & 0xFF) as u8);
        }
    }
    out
}

/// `n` samples with a recognizable ramp in each axis.
pub fn ramp(n: usize, offset: i16) -> Vec<[i16; 3]> {
    (0..n)
        .map(|i| {
            let i = i16::try_from(i).expect("too many samples") + offset;
            [i, -i, i * 2]
        })
        .collect()
}
