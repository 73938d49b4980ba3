//! QR code symbols: version selection, codeword layout and module placement.

use crate::mask;
use crate::reed_solomon;
use crate::segment::{BitBuffer, Segment};
use crate::tables::{self, Version};
use crate::{QrCodeEcc, QrError};

/// Width of the light margin around a symbol, in modules.
pub const QUIET_ZONE: u32 = 4;

/// A square grid of dark and light modules encoding some data.
///
/// Built once by one of the `encode_*` functions and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    version: Version,
    size: i32,
    ecc: QrCodeEcc,
    mask: u8,
    // Row-major, `true` is dark.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encode text in the most compact of the numeric, alphanumeric and byte modes,
    /// using the smallest version that fits at exactly the requested `ecc` level.
    ///
    /// # Errors
    ///
    /// [`QrError::DataTooLarge`] when even version 40 is too small.
    pub fn encode_text(text: &str, ecc: QrCodeEcc) -> Result<Self, QrError> {
        QrCode::encode_segments(&Segment::make_segments(text), ecc)
    }

    /// Encode arbitrary bytes in byte mode.
    ///
    /// # Errors
    ///
    /// [`QrError::DataTooLarge`] when even version 40 is too small.
    pub fn encode_binary(data: &[u8], ecc: QrCodeEcc) -> Result<Self, QrError> {
        QrCode::encode_segments(&[Segment::make_bytes(data)], ecc)
    }

    /// Encode already built segments.
    ///
    /// # Errors
    ///
    /// [`QrError::DataTooLarge`] when even version 40 is too small.
    pub fn encode_segments(segs: &[Segment], ecc: QrCodeEcc) -> Result<Self, QrError> {
        let version = select_version(segs, ecc)?;
        let data = data_codewords(segs, version, ecc);
        let qr = QrCode::encode_codewords(version, ecc, &data);
        tracing::debug!(
            version = version.value(),
            ecc = %ecc,
            mask = qr.mask,
            "encoded QR code"
        );
        Ok(qr)
    }

    fn encode_codewords(version: Version, ecc: QrCodeEcc, data: &[u8]) -> Self {
        let mut grid = ModuleGrid::new(version);
        grid.draw_function_patterns(ecc);
        grid.draw_codewords(&add_ecc_and_interleave(data, version, ecc));

        // Masks are XORs, applying one twice restores the grid.
        let mut best_mask = 0;
        let mut min_penalty = i32::MAX;
        for candidate in 0..8 {
            grid.apply_mask(candidate);
            grid.draw_format_bits(ecc, candidate);
            let penalty = mask::penalty_score(grid.size, &grid.modules);
            if penalty < min_penalty {
                best_mask = candidate;
                min_penalty = penalty;
            }
            grid.apply_mask(candidate);
        }
        grid.apply_mask(best_mask);
        grid.draw_format_bits(ecc, best_mask);

        QrCode {
            version,
            size: grid.size as i32,
            ecc,
            mask: best_mask,
            modules: grid.modules,
        }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Side length in modules, `4 * version + 17`, quiet zone excluded.
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecc
    }

    /// The mask pattern (0 to 7) the symbol was drawn with.
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Color of the module at column `x`, row `y`: `true` for dark.
    /// Coordinates outside the symbol are light, which covers the quiet zone.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        (0..self.size).contains(&x)
            && (0..self.size).contains(&y)
            && self.modules[(y * self.size + x) as usize]
    }

    /// The module grid with the light quiet zone around it, row by row.
    pub fn bordered_matrix(&self) -> Vec<Vec<bool>> {
        let border = QUIET_ZONE as i32;
        (-border..self.size + border)
            .map(|y| {
                (-border..self.size + border)
                    .map(|x| self.get_module(x, y))
                    .collect()
            })
            .collect()
    }
}

/// Smallest version whose data capacity at `ecc` holds every segment.
fn select_version(segs: &[Segment], ecc: QrCodeEcc) -> Result<Version, QrError> {
    let mut version = Version::MIN;
    loop {
        let capacity_bits = tables::num_data_codewords(version, ecc) * 8;
        if let Some(used) = Segment::total_bits(segs, version) {
            if used <= capacity_bits {
                return Ok(version);
            }
        }
        version = match version.next() {
            Some(next) => next,
            None => {
                return Err(QrError::DataTooLarge {
                    needed_bits: Segment::needed_bits(segs, version),
                    capacity_bits,
                })
            }
        };
    }
}

/// Headers, payload, terminator and padding, packed into the data codewords of `version`.
pub(crate) fn data_codewords(segs: &[Segment], version: Version, ecc: QrCodeEcc) -> Vec<u8> {
    let capacity_bits = tables::num_data_codewords(version, ecc) * 8;
    let mut bb = BitBuffer::default();
    for seg in segs {
        bb.append_bits(seg.mode().mode_bits(), 4);
        bb.append_bits(seg.num_chars() as u32, seg.mode().char_count_bits(version));
        bb.0.extend_from_slice(&seg.data().0);
    }
    debug_assert!(bb.len() <= capacity_bits);

    let terminator = (capacity_bits - bb.len()).min(4);
    bb.append_bits(0, terminator as u8);
    let to_byte_boundary = bb.len().wrapping_neg() & 7;
    bb.append_bits(0, to_byte_boundary as u8);
    for &pad in [0xEC, 0x11].iter().cycle() {
        if bb.len() >= capacity_bits {
            break;
        }
        bb.append_bits(pad, 8);
    }
    bb.to_bytes()
}

/// Splits the data codewords into blocks, appends each block's Reed–Solomon
/// codewords and interleaves everything into the final codeword sequence.
pub(crate) fn add_ecc_and_interleave(data: &[u8], version: Version, ecc: QrCodeEcc) -> Vec<u8> {
    assert_eq!(data.len(), tables::num_data_codewords(version, ecc));
    let num_blocks = tables::num_error_correction_blocks(version, ecc);
    let block_ecc_len = tables::ecc_codewords_per_block(version, ecc);
    let raw_codewords = tables::num_raw_data_modules(version) / 8;
    let num_short_blocks = num_blocks - raw_codewords % num_blocks;
    let short_block_len = raw_codewords / num_blocks;

    let divisor = reed_solomon::compute_divisor(block_ecc_len);
    let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(num_blocks);
    let mut rest = data;
    for i in 0..num_blocks {
        let data_len = short_block_len - block_ecc_len + usize::from(i >= num_short_blocks);
        let (block_data, tail) = rest.split_at(data_len);
        rest = tail;
        let mut block = block_data.to_vec();
        let ecc_codewords = reed_solomon::compute_remainder(&block, &divisor);
        // Placeholder so short and long blocks line up column by column.
        if i < num_short_blocks {
            block.push(0);
        }
        block.extend_from_slice(&ecc_codewords);
        blocks.push(block);
    }

    let mut result = Vec::with_capacity(raw_codewords);
    for i in 0..blocks[0].len() {
        for (j, block) in blocks.iter().enumerate() {
            if i != short_block_len - block_ecc_len || j >= num_short_blocks {
                result.push(block[i]);
            }
        }
    }
    debug_assert_eq!(result.len(), raw_codewords);
    result
}

/// 15-bit format information: ECC level and mask, BCH protected and XOR masked.
pub(crate) fn format_bits(ecc: QrCodeEcc, mask: u8) -> u32 {
    let data = ecc.format_bits() << 3 | u32::from(mask);
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * 0x537);
    }
    (data << 10 | rem) ^ 0x5412
}

/// 18-bit version information, only drawn for versions 7 and up.
pub(crate) fn version_bits(version: Version) -> u32 {
    let ver = u32::from(version.value());
    let mut rem = ver;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
    }
    ver << 12 | rem
}

fn get_bit(x: u32, i: usize) -> bool {
    (x >> i) & 1 != 0
}

/// Work area used while a symbol is being drawn.
struct ModuleGrid {
    version: Version,
    size: usize,
    modules: Vec<bool>,
    // Finder, timing, alignment, format and version modules, which masks leave alone.
    is_function: Vec<bool>,
}

impl ModuleGrid {
    fn new(version: Version) -> Self {
        let size = version.size();
        ModuleGrid {
            version,
            size,
            modules: vec![false; size * size],
            is_function: vec![false; size * size],
        }
    }

    fn set_function_module(&mut self, x: usize, y: usize, dark: bool) {
        let i = y * self.size + x;
        self.modules[i] = dark;
        self.is_function[i] = true;
    }

    fn draw_function_patterns(&mut self, ecc: QrCodeEcc) {
        for i in 0..self.size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        let far = self.size - 4;
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(far, 3);
        self.draw_finder_pattern(3, far);

        let positions = tables::alignment_pattern_positions(self.version);
        let last = positions.len().saturating_sub(1);
        for (i, &x) in positions.iter().enumerate() {
            for (j, &y) in positions.iter().enumerate() {
                // The three corners taken by finder patterns.
                if (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0) {
                    continue;
                }
                self.draw_alignment_pattern(x, y);
            }
        }

        // Reserve the format area; the real bits are drawn once the mask is known.
        self.draw_format_bits(ecc, 0);
        self.draw_version();
    }

    /// 7×7 finder centred on (x, y) plus its light separator, clipped to the symbol.
    fn draw_finder_pattern(&mut self, x: usize, y: usize) {
        for dy in -4i32..=4 {
            for dx in -4i32..=4 {
                let xx = x as i32 + dx;
                let yy = y as i32 + dy;
                if (0..self.size as i32).contains(&xx) && (0..self.size as i32).contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function_module(xx as usize, yy as usize, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: usize, y: usize) {
        for dy in -2i32..=2 {
            for dx in -2i32..=2 {
                let dist = dx.abs().max(dy.abs());
                self.set_function_module(
                    (x as i32 + dx) as usize,
                    (y as i32 + dy) as usize,
                    dist != 1,
                );
            }
        }
    }

    fn draw_format_bits(&mut self, ecc: QrCodeEcc, mask: u8) {
        let bits = format_bits(ecc, mask);
        let size = self.size;

        // Around the top left finder.
        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i));
        }

        // Split between the other two finders.
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i));
        }
        // Always dark.
        self.set_function_module(8, size - 8, true);
    }

    fn draw_version(&mut self) {
        if self.version.value() < 7 {
            return;
        }
        let bits = version_bits(self.version);
        for i in 0..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    /// Zig-zags through the non-function modules two columns at a time,
    /// right to left, skipping the vertical timing column.
    /// Remainder bits past the last codeword stay light.
    fn draw_codewords(&mut self, data: &[u8]) {
        let size = self.size;
        let total_bits = data.len() * 8;
        let mut i = 0;
        let mut right = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            let upward = (right + 1) & 2 == 0;
            for vert in 0..size {
                let y = if upward { size - 1 - vert } else { vert };
                for j in 0..2 {
                    let x = right - j;
                    let idx = y * size + x;
                    if !self.is_function[idx] && i < total_bits {
                        self.modules[idx] = get_bit(u32::from(data[i >> 3]), 7 - (i & 7));
                        i += 1;
                    }
                }
            }
            if right < 2 {
                break;
            }
            right -= 2;
        }
        debug_assert_eq!(i, total_bits);
    }

    fn apply_mask(&mut self, mask: u8) {
        for y in 0..self.size {
            for x in 0..self.size {
                let idx = y * self.size + x;
                if !self.is_function[idx] && mask::is_flipped(mask, x, y) {
                    self.modules[idx] = !self.modules[idx];
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "otpauth://totp/Example:alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example";

    fn reference(text: &str, ecc: QrCodeEcc) -> qrcodegen::QrCode {
        let ecl = match ecc {
            QrCodeEcc::Low => qrcodegen::QrCodeEcc::Low,
            QrCodeEcc::Medium => qrcodegen::QrCodeEcc::Medium,
            QrCodeEcc::Quartile => qrcodegen::QrCodeEcc::Quartile,
            QrCodeEcc::High => qrcodegen::QrCodeEcc::High,
        };
        let segs = qrcodegen::QrSegment::make_segments(text);
        qrcodegen::QrCode::encode_segments_advanced(
            &segs,
            ecl,
            qrcodegen::Version::MIN,
            qrcodegen::Version::MAX,
            None,
            false,
        )
        .unwrap()
    }

    fn assert_same_modules(text: &str, ecc: QrCodeEcc) {
        let ours = QrCode::encode_text(text, ecc).unwrap();
        let theirs = reference(text, ecc);
        assert_eq!(ours.size(), theirs.size(), "size of {:?} at {}", text, ecc);
        assert_eq!(
            i32::from(ours.version().value()),
            i32::from(theirs.version().value())
        );
        for y in 0..ours.size() {
            for x in 0..ours.size() {
                assert_eq!(
                    ours.get_module(x, y),
                    theirs.get_module(x, y),
                    "module ({}, {}) of {:?} at {}",
                    x,
                    y,
                    text,
                    ecc
                );
            }
        }
    }

    #[test]
    fn data_codewords_of_numeric_example() {
        let segs = Segment::make_segments("01234567");
        let version = select_version(&segs, QrCodeEcc::Medium).unwrap();
        assert_eq!(version, Version::MIN);
        assert_eq!(
            data_codewords(&segs, version, QrCodeEcc::Medium),
            vec![
                0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
                0xEC, 0x11
            ]
        );
    }

    #[test]
    fn single_block_appends_ecc() {
        let segs = Segment::make_segments("01234567");
        let data = data_codewords(&segs, Version::MIN, QrCodeEcc::Medium);
        let all = add_ecc_and_interleave(&data, Version::MIN, QrCodeEcc::Medium);
        assert_eq!(&all[..16], &data[..]);
        assert_eq!(
            &all[16..],
            &[0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
        );
    }

    #[test]
    fn interleaving_covers_every_codeword() {
        // Version 5-Q has two short and two long blocks.
        let version = Version::new(5).unwrap();
        let n = tables::num_data_codewords(version, QrCodeEcc::Quartile);
        let data: Vec<u8> = (0..n as u8).collect();
        let all = add_ecc_and_interleave(&data, version, QrCodeEcc::Quartile);
        assert_eq!(all.len(), tables::num_raw_data_modules(version) / 8);
        // Column-wise: first bytes of the four blocks (15, 15, 16, 16 data codewords).
        assert_eq!(&all[..4], &[0, 15, 30, 46]);
        // The extra codeword of the long blocks comes right before the ECC.
        assert_eq!(&all[60..62], &[45, 61]);
    }

    #[test]
    fn format_and_version_information() {
        assert_eq!(format_bits(QrCodeEcc::Medium, 0), 0x5412);
        assert_eq!(format_bits(QrCodeEcc::Low, 0), 0x77C4);
        assert_eq!(format_bits(QrCodeEcc::High, 7), 0x083B);
        assert_eq!(version_bits(Version::new(7).unwrap()), 0x07C94);
        assert_eq!(version_bits(Version::MAX), 0x28C69);
    }

    #[test]
    fn side_matches_version() {
        for ecc in QrCodeEcc::ALL {
            let qr = QrCode::encode_text(URL, ecc).unwrap();
            assert_eq!(qr.size() as usize, qr.version().size());
            assert_eq!(qr.size(), i32::from(qr.version().value()) * 4 + 17);
            assert_eq!(qr.error_correction_level(), ecc);
            assert!(qr.mask() < 8);
        }
    }

    #[test]
    fn provisioning_url_at_quartile_is_version_7() {
        // 81 bytes need 4 + 8 + 648 bits, 83 codewords; 6-Q holds 76, 7-Q 88.
        let qr = QrCode::encode_text(URL, QrCodeEcc::Quartile).unwrap();
        assert_eq!(URL.len(), 81);
        assert_eq!(qr.version().value(), 7);
    }

    #[test]
    fn finder_and_timing_patterns() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Medium).unwrap();
        assert_eq!(qr.version(), Version::MIN);
        let size = qr.size();
        for (cx, cy) in [(3, 3), (size - 4, 3), (3, size - 4)] {
            assert!(qr.get_module(cx, cy));
            assert!(qr.get_module(cx - 3, cy - 3));
            assert!(!qr.get_module(cx - 2, cy - 2));
        }
        for i in 8..size - 8 {
            assert_eq!(qr.get_module(i, 6), i % 2 == 0);
            assert_eq!(qr.get_module(6, i), i % 2 == 0);
        }
        assert!(qr.get_module(8, size - 8));
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, size));
    }

    #[test]
    fn matches_reference_encoder() {
        let long: String = "otpauth-migration://offline?data="
            .chars()
            .chain(std::iter::repeat('x').take(400))
            .collect();
        let texts = ["", "01234567", "HELLO WORLD", URL, long.as_str()];
        for text in texts {
            for ecc in QrCodeEcc::ALL {
                assert_same_modules(text, ecc);
            }
        }
    }

    #[test]
    fn deterministic() {
        let a = QrCode::encode_text(URL, QrCodeEcc::Quartile).unwrap();
        let b = QrCode::encode_text(URL, QrCodeEcc::Quartile).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn capacity_limit_at_low() {
        // Version 40-L: 2956 codewords, minus 4 + 16 header bits.
        let fits = vec![b'a'; 2953];
        let qr = QrCode::encode_binary(&fits, QrCodeEcc::Low).unwrap();
        assert_eq!(qr.version(), Version::MAX);
        assert_eq!(qr.size(), 177);

        let too_long = vec![b'a'; 2954];
        let err = QrCode::encode_binary(&too_long, QrCodeEcc::Low).unwrap_err();
        assert_eq!(
            err,
            QrError::DataTooLarge {
                needed_bits: 4 + 16 + 2954 * 8,
                capacity_bits: 2956 * 8,
            }
        );
    }

    #[test]
    fn bordered_matrix_adds_quiet_zone() {
        let qr = QrCode::encode_text("HELLO WORLD", QrCodeEcc::Quartile).unwrap();
        let matrix = qr.bordered_matrix();
        let side = qr.size() as usize + 2 * QUIET_ZONE as usize;
        assert_eq!(matrix.len(), side);
        assert!(matrix.iter().all(|row| row.len() == side));
        assert!(matrix[0].iter().all(|&m| !m));
        assert!(matrix[4][4]);
    }
}
