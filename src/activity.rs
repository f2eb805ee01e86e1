//! Activity record sample decoding.
//!
//! Two payload layouts exist. [RecordType::Activity](crate::RecordType::Activity) packs
//! each axis value into 12 bits and [RecordType::Activity2](crate::RecordType::Activity2)
//! stores plain little-endian `i16`s. Both hold one second of samples, three axis values
//! per sample, stored in the order they appear in the payload.
//!
//! References:
//! * [Activity](https://github.com/actigraph/GT3X-File-Format/blob/master/LogRecords/Activity.md)
//! * [Activity2](https://github.com/actigraph/GT3X-File-Format/blob/master/LogRecords/Activity2.md)

/// Number of axis values per sample.
pub const AXES: usize = 3;

/// One decoded sample, raw device counts.
pub type Sample = [i16; AXES];

/// Reads consecutive signed 12-bit values from a packed byte stream.
///
/// Every two values share three bytes: the first value is the first byte followed by the
/// high nibble of the second, the next value is the low nibble of the second byte followed
/// by the third byte.
pub struct Packed12<'a> {
    bytes: std::slice::Iter<'a, u8>,
    odd: bool,
    // low nibble of the second byte of the last even value
    nibble: u8,
}

impl<'a> Packed12<'a> {
    #[must_use]
    pub fn new(dat: &'a [u8]) -> Self {
        Packed12 {
            bytes: dat.iter(),
            odd: false,
            nibble: 0,
        }
    }
}

impl Iterator for Packed12<'_> {
    type Item = i16;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = if self.odd {
            let b = *self.bytes.next()?;
            (u16::from(self.nibble) << 8) | u16::from(b)
        } else {
            let b1 = *self.bytes.next()?;
            let b2 = *self.bytes.next()?;
            self.nibble = b2 & 0x0F;
            (u16::from(b1) << 4) | u16::from(b2 >> 4)
        };
        self.odd = !self.odd;
        Some(sign_extend_12(raw))
    }
}

/// Widen a 12-bit two's-complement value to 16 bits.
fn sign_extend_12(raw: u16) -> i16 {
    if raw & 0x0800 != 0 {
        (raw | 0xF000) as i16
    } else {
        raw as i16
    }
}

/// Decode up to `count` samples from a 12-bit packed payload.
///
/// Decoding stops at the first sample that cannot be completed, so a truncated payload
/// produces only its whole samples.
pub fn decode_packed(payload: &[u8], count: usize) -> impl Iterator<Item = Sample> + '_ {
    let mut values = Packed12::new(payload);
    std::iter::from_fn(move || Some([values.next()?, values.next()?, values.next()?]))
        .take(count)
}

/// Decode up to `count` samples from a little-endian `i16` payload.
pub fn decode_plain(payload: &[u8], count: usize) -> impl Iterator<Item = Sample> + '_ {
    payload
        .chunks_exact(AXES * 2)
        .take(count)
        .map(|c| {
            [
                i16::from_le_bytes([c[0], c[1]]),
                i16::from_le_bytes([c[2], c[3]]),
                i16::from_le_bytes([c[4], c[5]]),
            ]
        })
}
