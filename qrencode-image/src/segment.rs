//! Data segments: the payload converted to bits in the most compact of the
//! numeric, alphanumeric and byte modes.

use crate::Version;

/// Characters allowed in alphanumeric mode, in code order.
const ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// How a segment's characters are packed into bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl Mode {
    /// The 4-bit mode indicator.
    pub(crate) fn mode_bits(self) -> u32 {
        match self {
            Mode::Numeric => 0x1,
            Mode::Alphanumeric => 0x2,
            Mode::Byte => 0x4,
        }
    }

    /// Width of the character count field, which grows with the version.
    pub(crate) fn char_count_bits(self, ver: Version) -> u8 {
        let widths: [u8; 3] = match self {
            Mode::Numeric => [10, 12, 14],
            Mode::Alphanumeric => [9, 11, 13],
            Mode::Byte => [8, 16, 16],
        };
        widths[usize::from((ver.value() + 7) / 17)]
    }
}

/// An append-only sequence of bits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitBuffer(pub Vec<bool>);

impl BitBuffer {
    /// Appends the `len` low bits of `val`, most significant first.
    pub fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && val >> len == 0, "Value out of range");
        self.0.extend((0..len).rev().map(|i| (val >> i) & 1 != 0));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Packs the bits into bytes, most significant bit first. The length must be a multiple of 8.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        debug_assert_eq!(self.0.len() % 8, 0);
        self.0
            .chunks(8)
            .map(|byte| byte.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
            .collect()
    }
}

/// A run of characters encoded in a single mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    mode: Mode,
    num_chars: usize,
    data: BitBuffer,
}

impl Segment {
    /// Byte mode segment holding arbitrary binary data.
    pub fn make_bytes(data: &[u8]) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(u32::from(b), 8);
        }
        Segment {
            mode: Mode::Byte,
            num_chars: data.len(),
            data: bb,
        }
    }

    /// Numeric mode segment. Panics if `text` contains anything but ASCII digits.
    pub fn make_numeric(text: &str) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 3 + (text.len() + 2) / 3));
        for chunk in text.as_bytes().chunks(3) {
            let val = chunk.iter().fold(0u32, |acc, &c| {
                assert!(c.is_ascii_digit(), "String contains non-numeric characters");
                acc * 10 + u32::from(c - b'0')
            });
            bb.append_bits(val, chunk.len() as u8 * 3 + 1);
        }
        Segment {
            mode: Mode::Numeric,
            num_chars: text.len(),
            data: bb,
        }
    }

    /// Alphanumeric mode segment. Panics on characters outside [`Segment::is_alphanumeric`].
    pub fn make_alphanumeric(text: &str) -> Self {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 6));
        let codes: Vec<u32> = text
            .chars()
            .map(|c| {
                ALPHANUMERIC_CHARSET
                    .find(c)
                    .expect("String contains unencodable characters in alphanumeric mode")
                    as u32
            })
            .collect();
        for pair in codes.chunks(2) {
            match *pair {
                [a, b] => bb.append_bits(a * 45 + b, 11),
                [a] => bb.append_bits(a, 6),
                _ => unreachable!(),
            }
        }
        Segment {
            mode: Mode::Alphanumeric,
            num_chars: codes.len(),
            data: bb,
        }
    }

    /// Picks the most compact single mode able to hold `text`.
    /// Empty text yields no segment at all.
    pub fn make_segments(text: &str) -> Vec<Self> {
        if text.is_empty() {
            Vec::new()
        } else if Segment::is_numeric(text) {
            vec![Segment::make_numeric(text)]
        } else if Segment::is_alphanumeric(text) {
            vec![Segment::make_alphanumeric(text)]
        } else {
            vec![Segment::make_bytes(text.as_bytes())]
        }
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    pub fn data(&self) -> &BitBuffer {
        &self.data
    }

    /// Header and payload bits of `segs` at `ver`, or `None` when a character
    /// count does not fit its field at that version.
    pub(crate) fn total_bits(segs: &[Self], ver: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits = seg.mode.char_count_bits(ver);
            if seg.num_chars >= 1 << ccbits {
                return None;
            }
            result = result.checked_add(4 + usize::from(ccbits) + seg.data.len())?;
        }
        Some(result)
    }

    /// Like [`Segment::total_bits`], ignoring the character count limits.
    pub(crate) fn needed_bits(segs: &[Self], ver: Version) -> usize {
        segs.iter()
            .map(|seg| 4 + usize::from(seg.mode.char_count_bits(ver)) + seg.data.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn numeric_groups() {
        let seg = Segment::make_numeric("01234567");
        assert_eq!(seg.mode(), Mode::Numeric);
        assert_eq!(seg.num_chars(), 8);
        assert_eq!(seg.data().0, bits("000000110001010110011000011"));
    }

    #[test]
    fn alphanumeric_pairs() {
        let seg = Segment::make_alphanumeric("AC-42");
        assert_eq!(seg.num_chars(), 5);
        assert_eq!(seg.data().0, bits("0011100111011100111001000010"));
    }

    #[test]
    fn byte_mode() {
        let seg = Segment::make_bytes(b"a@");
        assert_eq!(seg.data().0, bits("0110000101000000"));
    }

    #[test]
    fn mode_selection() {
        assert!(Segment::make_segments("").is_empty());
        assert_eq!(Segment::make_segments("0123")[0].mode(), Mode::Numeric);
        assert_eq!(
            Segment::make_segments("HELLO WORLD")[0].mode(),
            Mode::Alphanumeric
        );
        assert_eq!(
            Segment::make_segments("otpauth://totp/Example:alice%40example.com")[0].mode(),
            Mode::Byte
        );
    }

    #[test]
    fn char_count_widths() {
        let v = |n| Version::new(n).unwrap();
        assert_eq!(Mode::Byte.char_count_bits(v(9)), 8);
        assert_eq!(Mode::Byte.char_count_bits(v(10)), 16);
        assert_eq!(Mode::Numeric.char_count_bits(v(26)), 12);
        assert_eq!(Mode::Numeric.char_count_bits(v(27)), 14);
        assert_eq!(Mode::Alphanumeric.char_count_bits(v(40)), 13);
    }

    #[test]
    fn total_bits_rejects_overlong_counts() {
        let seg = Segment::make_bytes(&[0u8; 256]);
        assert_eq!(
            Segment::total_bits(std::slice::from_ref(&seg), Version::MIN),
            None
        );
        assert_eq!(
            Segment::total_bits(&[seg], Version::new(10).unwrap()),
            Some(4 + 16 + 256 * 8)
        );
    }

    #[test]
    fn bit_buffer_packs_msb_first() {
        let mut bb = BitBuffer::default();
        bb.append_bits(0x1, 4);
        bb.append_bits(0x0, 4);
        bb.append_bits(0xEC, 8);
        assert_eq!(bb.to_bytes(), vec![0x10, 0xEC]);
    }
}
