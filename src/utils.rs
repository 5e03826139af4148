//! Small free-function helpers shared by the magic-table oracle and the
//! move generator. `pop_lsb` mirrors `BitboardExt::pop_lsb` as a free
//! function (some call sites read more naturally without the trait import).

use crate::bitboard::BitboardExt;

#[inline(always)]
pub fn square_index(rank: usize, file: usize) -> usize {
    rank * 8 + file
}

/// Clears and returns the least-significant set bit's index. Panics if `bb`
/// is already empty — callers always guard with a `while bb != 0` loop.
#[inline(always)]
pub fn pop_lsb(bb: &mut u64) -> u8 {
    bb.pop_lsb().expect("pop_lsb called on empty bitboard")
}
