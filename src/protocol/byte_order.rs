//! In-place byte-order normalization
//!
//! The camera transmits depth samples as big-endian 16-bit words and the
//! metadata block as big-endian 32-bit words. Both helpers swap complete words
//! only; a trailing partial word is left untouched.

/// Swap the bytes of every 16-bit word in `data`.
pub fn swap_u16_words(data: &mut [u8]) {
    for word in data.chunks_exact_mut(2) {
        word.swap(0, 1);
    }
}

/// Reverse the bytes of every 32-bit word in `data`.
pub fn swap_u32_words(data: &mut [u8]) {
    for word in data.chunks_exact_mut(4) {
        word.reverse();
    }
}
