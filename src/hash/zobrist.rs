//! Zobrist key tables for the mirrored own/enemy position.
//!
//! `mirror()` only XORs `side_to_move` (§4.7), which means every other key
//! table must itself be symmetric under the mirror map: recomputing from
//! scratch after a mirror must reproduce the same total key, since mirroring
//! relabels which side's pieces are "own" (own <-> enemy) *and* moves every
//! square to its mirror. Concretely, for the piece table indexed by
//! `[owner][piece][square]`:
//!   key.piece[own][piece][sq] == key.piece[enemy][piece][sq.mirror()]
//! (an own piece at `sq` becomes, after a full mirror, an enemy piece at
//! `sq.mirror()` — the two must contribute the same XOR term for the total
//! key to be invariant apart from the single `side_to_move` flip).
//! The castling table needs the analogous property:
//!   key.castling[rights] == key.castling[mirror_castle_bits(rights)]
//! Both tables are built by generating one random value per mirror-pair and
//! assigning it to both members of the pair, rather than drawing independent
//! values per entry.

use crate::bitboard::BitboardExt;
use crate::board::{mirror_castle_bits, CastleBits, Piece, Position};
use crate::square::Square;
use once_cell::sync::OnceCell;
use rand::{rngs::StdRng, RngCore, SeedableRng};

#[cfg(feature = "deterministic_zobrist")]
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

fn make_zobrist_rng() -> StdRng {
    #[cfg(feature = "deterministic_zobrist")]
    {
        StdRng::seed_from_u64(ZOBRIST_SEED)
    }
    #[cfg(not(feature = "deterministic_zobrist"))]
    {
        let mut seed = [0u8; 32];
        rand::rng().fill_bytes(&mut seed);
        StdRng::from_seed(seed)
    }
}

#[inline]
fn non_zero(rng: &mut StdRng) -> u64 {
    let mut v = rng.next_u64();
    while v == 0 {
        v = rng.next_u64();
    }
    v
}

pub struct ZobristKeys {
    /// `[owner: 0=own,1=enemy][piece][square]`. See module docs for the
    /// mirror-symmetry constraint this table must satisfy.
    pub piece: [[[u64; 64]; 6]; 2],
    /// Indexed by the raw 4-bit `CastleBits` value, mirror-symmetric per pair.
    pub castling: [u64; 16],
    /// File-only (mirroring never changes file).
    pub ep_file: [u64; 8],
    pub side_to_move: u64,
}

pub fn piece_index(piece: Piece) -> usize {
    match piece {
        Piece::Pawn => 0,
        Piece::Knight => 1,
        Piece::Bishop => 2,
        Piece::Rook => 3,
        Piece::Queen => 4,
        Piece::King => 5,
    }
}

fn fill_symmetric_piece_table(rng: &mut StdRng) -> [[[u64; 64]; 6]; 2] {
    // own = 0, enemy = 1. Required: table[0][p][sq] == table[1][p][sq.mirror()].
    // Draw one value per (piece, {sq, mirror(sq)}) and cross-assign it to
    // own@sq/enemy@msq, then a second independent value for own@msq/enemy@sq.
    let mut table = [[[0u64; 64]; 6]; 2];
    for piece in 0..6 {
        for sq in 0u8..64 {
            let m = Square::from_index(sq).mirror().index();
            if m > sq {
                let v1 = non_zero(rng);
                table[0][piece][sq as usize] = v1;
                table[1][piece][m as usize] = v1;
                let v2 = non_zero(rng);
                table[0][piece][m as usize] = v2;
                table[1][piece][sq as usize] = v2;
            }
        }
    }
    table
}

fn fill_symmetric_castling_table(rng: &mut StdRng) -> [u64; 16] {
    let mut table = [0u64; 16];
    let mut assigned = [false; 16];
    for rights in 0u8..16 {
        if assigned[rights as usize] {
            continue;
        }
        let m = mirror_castle_bits(rights);
        let v = non_zero(rng);
        table[rights as usize] = v;
        table[m as usize] = v;
        assigned[rights as usize] = true;
        assigned[m as usize] = true;
    }
    table
}

fn generate_zobrist_keys_with_rng(mut rng: StdRng) -> ZobristKeys {
    let piece = fill_symmetric_piece_table(&mut rng);
    let castling = fill_symmetric_castling_table(&mut rng);
    let mut ep_file = [0u64; 8];
    for key in ep_file.iter_mut() {
        *key = non_zero(&mut rng);
    }
    let side_to_move = non_zero(&mut rng);

    ZobristKeys {
        piece,
        castling,
        ep_file,
        side_to_move,
    }
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_zobrist_keys_with_rng(make_zobrist_rng()))
}

#[inline]
pub fn xor_castling_rights_delta(hash: &mut u64, keys: &ZobristKeys, old: CastleBits, new: CastleBits) {
    if old != new {
        *hash ^= keys.castling[old as usize];
        *hash ^= keys.castling[new as usize];
    }
}

/// `owner_is_enemy = false` for an own piece, `true` for an enemy piece —
/// the axis `moves::execute`'s incremental updates XOR in and out as pieces
/// move, are captured, or are promoted.
#[inline(always)]
pub fn piece_square_key(keys: &ZobristKeys, owner_is_enemy: bool, piece: Piece, sq: Square) -> u64 {
    keys.piece[owner_is_enemy as usize][piece_index(piece)][sq.index() as usize]
}

/// Relaxed en-passant hash rule: the EP file only contributes to the key if
/// the side to move has a pawn that could actually capture onto the target
/// (pseudo-legally — pins/king safety are not consulted here). Without this,
/// two positions differing only in an EP target nobody can use would hash
/// differently despite being the same position for every search purpose.
pub(crate) fn ep_file_to_hash(pos: &Position) -> Option<u8> {
    let target = pos.ep_target?;
    let attackers = crate::moves::attacks::enemy_pawn_attacks(target.index());
    if attackers & pos.own_pieces & pos.pawns() != 0 {
        Some(target.file())
    } else {
        None
    }
}

/// Recomputes the Zobrist key for `pos` from scratch. Must agree with the
/// incrementally maintained `pos.zobrist` at every ply (§8).
pub fn compute_full(pos: &Position) -> u64 {
    let keys = zobrist_keys();
    let mut key = 0u64;

    let mut own = pos.own_pieces;
    while let Some(idx) = own.pop_lsb() {
        let sq = Square::from_index(idx);
        if let Some((_, piece)) = pos.piece_at(sq) {
            key ^= keys.piece[0][piece_index(piece)][sq.index() as usize];
        }
    }
    let mut enemy = pos.enemy_pieces;
    while let Some(idx) = enemy.pop_lsb() {
        let sq = Square::from_index(idx);
        if let Some((_, piece)) = pos.piece_at(sq) {
            key ^= keys.piece[1][piece_index(piece)][sq.index() as usize];
        }
    }

    key ^= keys.castling[pos.castling_rights as usize];

    if let Some(file) = ep_file_to_hash(pos) {
        key ^= keys.ep_file[file as usize];
    }

    if pos.is_flipped {
        key ^= keys.side_to_move;
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_table_is_mirror_symmetric() {
        let keys = zobrist_keys();
        for piece in 0..6 {
            for sq in 0u8..64 {
                let m = Square::from_index(sq).mirror().index();
                assert_eq!(keys.piece[0][piece][sq as usize], keys.piece[1][piece][m as usize]);
                assert_eq!(keys.piece[1][piece][sq as usize], keys.piece[0][piece][m as usize]);
            }
        }
    }

    #[test]
    fn castling_table_is_mirror_symmetric() {
        let keys = zobrist_keys();
        for rights in 0u8..16 {
            let m = mirror_castle_bits(rights);
            assert_eq!(keys.castling[rights as usize], keys.castling[m as usize]);
        }
    }

    #[test]
    fn full_recompute_matches_incremental_after_mirror() {
        let mut pos = Position::new_game();
        assert_eq!(pos.zobrist, compute_full(&pos));
        pos.mirror();
        assert_eq!(pos.zobrist, compute_full(&pos));
    }

    #[test]
    fn ep_file_only_hashed_when_capturable() {
        use std::str::FromStr;

        // spec.md §8 scenario 5: c4 pawn can take the d4 pawn en passant.
        let capturable = Position::from_str("8/8/8/2k5/2pP4/8/B7/4K3 b - d3 0 1").unwrap();
        assert_eq!(ep_file_to_hash(&capturable), Some(3));
        assert_eq!(compute_full(&capturable), capturable.zobrist);

        // Same ep target, but no own pawn adjacent to it: must not be hashed.
        let not_capturable = Position::from_str("8/8/8/3k4/3P4/8/B7/4K3 b - d3 0 1").unwrap();
        assert_eq!(ep_file_to_hash(&not_capturable), None);
    }
}
