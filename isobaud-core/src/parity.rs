//! Parity computation
//!
//! Shared by the transmitter (to generate the parity bit) and the receiver
//! (to check it), so both sides agree by construction.

use crate::config::Parity;

/// XOR of the low `bits` bits of `data`
///
/// This is the even-parity bit: set when the count of set bits is odd.
/// Widths past 16 cover the whole word.
pub fn xor_reduce(data: u16, bits: u8) -> bool {
    let mask = 1u32
        .checked_shl(u32::from(bits))
        .map_or(u32::MAX, |bit| bit - 1);
    (u32::from(data) & mask).count_ones() % 2 == 1
}

/// Parity bit for the low `bits` bits of `data`
///
/// Returns `None` when the mode carries no parity bit.
pub fn parity_bit(data: u16, bits: u8, parity: Parity) -> Option<bool> {
    match parity {
        Parity::None => None,
        Parity::Even => Some(xor_reduce(data, bits)),
        Parity::Odd => Some(!xor_reduce(data, bits)),
    }
}
