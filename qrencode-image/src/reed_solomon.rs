//! Reed–Solomon error correction over GF(2^8) with the QR reducing polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11D).

const GF_REDUCING_POLYNOMIAL: u16 = 0x11D;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= GF_REDUCING_POLYNOMIAL;
        }
        i += 1;
    }
    // α^255 == α^0
    exp[255] = 1;
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();

/// Antilog table: `EXP[i] == α^i`.
pub(crate) const EXP: [u8; 256] = TABLES.0;
/// Log table: `LOG[α^i] == i`. `LOG[0]` is meaningless.
pub(crate) const LOG: [u8; 256] = TABLES.1;

/// Product of two field elements.
pub(crate) fn multiply(x: u8, y: u8) -> u8 {
    if x == 0 || y == 0 {
        return 0;
    }
    let sum = usize::from(LOG[usize::from(x)]) + usize::from(LOG[usize::from(y)]);
    EXP[sum % 255]
}

/// Coefficients of the generator polynomial (x − α^0)(x − α^1)…(x − α^(degree−1)),
/// highest power first, with the leading 1 dropped.
pub(crate) fn compute_divisor(degree: usize) -> Vec<u8> {
    assert!((1..=255).contains(&degree), "Degree out of range");
    let mut result = vec![0u8; degree];
    result[degree - 1] = 1;
    let mut root: u8 = 1;
    for _ in 0..degree {
        for j in 0..degree {
            result[j] = multiply(result[j], root);
            if j + 1 < degree {
                result[j] ^= result[j + 1];
            }
        }
        root = multiply(root, 0x02);
    }
    result
}

/// Remainder of `data · x^degree` divided by the generator polynomial:
/// the error correction codewords of one block.
pub(crate) fn compute_remainder(data: &[u8], divisor: &[u8]) -> Vec<u8> {
    let mut result = vec![0u8; divisor.len()];
    for b in data {
        let factor = b ^ result.remove(0);
        result.push(0);
        for (x, &y) in result.iter_mut().zip(divisor.iter()) {
            *x ^= multiply(y, factor);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_and_exp_are_inverse() {
        for i in 0..255usize {
            assert_eq!(usize::from(LOG[usize::from(EXP[i])]), i);
        }
        assert_eq!(EXP[8], 0x1D);
        assert_eq!(EXP[255], 1);
    }

    #[test]
    fn multiply_matches_shift_and_add() {
        fn slow(x: u8, y: u8) -> u8 {
            let mut z: u16 = 0;
            for i in (0..8).rev() {
                z = (z << 1) ^ ((z >> 7) * GF_REDUCING_POLYNOMIAL);
                z ^= u16::from((y >> i) & 1) * u16::from(x);
            }
            z as u8
        }
        for x in 0..=255u8 {
            for y in [0u8, 1, 2, 3, 0x53, 0x80, 0xCA, 0xFF] {
                assert_eq!(multiply(x, y), slow(x, y), "{} * {}", x, y);
            }
        }
    }

    #[test]
    fn divisor_degree_7() {
        // α exponents of the degree 7 generator from the QR code tables.
        let exponents = [87usize, 229, 146, 149, 238, 102, 21];
        let expected: Vec<u8> = exponents.iter().map(|&e| EXP[e]).collect();
        assert_eq!(compute_divisor(7), expected);
    }

    #[test]
    fn remainder_of_version_1_m_example() {
        // "01234567" in numeric mode, version 1-M.
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        let ecc = compute_remainder(&data, &compute_divisor(10));
        assert_eq!(
            ecc,
            vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]
        );
    }
}
