// Feature extraction, bit quantization, hex codec and the hash pipeline
pub mod codec;
pub mod engine;
pub mod features;
pub mod quantize;

pub use codec::{bits_to_hex, hex_to_bits};
pub use engine::{compute_bits, compute_hash, hash_pixels, wavelet_hash};
pub use features::extract_features;
pub use quantize::{normalize_length, quantize_to_bits};
