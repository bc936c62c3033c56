use std::fmt::Write;

use crate::error::{Error, Result};

/// Pack bits MSB-first into bytes, zero-padding to a multiple of 8, and
/// hex-encode them in lowercase
pub fn bits_to_hex(bits: &[u8]) -> String {
    let mut hex = String::with_capacity(bits.len().div_ceil(8) * 2);
    for chunk in bits.chunks(8) {
        let mut byte = 0u8;
        for (i, &bit) in chunk.iter().enumerate() {
            if bit != 0 {
                byte |= 0x80 >> i;
            }
        }
        // Writing to a String never fails
        let _ = write!(hex, "{:02x}", byte);
    }
    hex
}

/// Decode a hex hash back into `bit_len` bits, dropping the padding
pub fn hex_to_bits(hex: &str, bit_len: usize) -> Result<Vec<u8>> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidHex(format!("invalid hex digits in '{}'", hex)));
    }
    if hex.len() % 2 != 0 {
        return Err(Error::InvalidHex(format!("odd number of hex digits in '{}'", hex)));
    }

    let available = hex.len() * 4;
    if bit_len > available {
        return Err(Error::InvalidHex(format!(
            "'{}' holds {} bits, {} requested",
            hex, available, bit_len
        )));
    }

    let mut bits = Vec::with_capacity(available);
    for i in (0..hex.len()).step_by(2) {
        let pair = &hex[i..i + 2];
        let byte = u8::from_str_radix(pair, 16)
            .map_err(|_| Error::InvalidHex(format!("invalid hex digits '{}'", pair)))?;
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1);
        }
    }

    bits.truncate(bit_len);
    Ok(bits)
}
