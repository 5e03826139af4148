//! FEN parsing and emission. The internal `Position` is mover-relative and
//! (when `is_flipped`) rank-mirrored relative to the absolute, White-bottom
//! board that FEN text describes — every square crossing this boundary is
//! translated through `Square::mirror()` exactly once.

use super::fen_tables::{CHAR_TO_PC, PC_TO_CHAR};
use super::{CastleBits, Color, Piece, Position, CASTLE_ENEMY_K, CASTLE_ENEMY_Q, CASTLE_OWN_K, CASTLE_OWN_Q};
use crate::errors::ParseError;
use crate::square::Square;

pub fn parse_fen(s: &str) -> Result<Position, ParseError> {
    let fields: Vec<&str> = s.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(ParseError::WrongFieldCount { found: fields.len() });
    }

    let (white_pieces, black_pieces, rook_queens, bishop_queens, pawns, white_king, black_king) =
        parse_placement(fields[0])?;

    let side = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(ParseError::BadSideToMove(other.to_string())),
    };

    let (own_castle, enemy_castle) = parse_castling(fields[2], side)?;
    let castling_rights = own_castle | enemy_castle;

    let ep_absolute = parse_en_passant(fields[3])?;

    let halfmove_clock: u16 = fields[4]
        .parse()
        .map_err(|_| ParseError::BadHalfmoveClock(fields[4].to_string()))?;
    let fullmove_number: u16 = fields[5]
        .parse()
        .map_err(|_| ParseError::BadFullmoveNumber(fields[5].to_string()))?;

    let is_flipped = side == Color::Black;
    let (own_pieces, enemy_pieces, own_king, enemy_king) = match side {
        Color::White => (white_pieces, black_pieces, white_king, black_king),
        Color::Black => (black_pieces, white_pieces, black_king, white_king),
    };

    let mut pos = if is_flipped {
        Position {
            own_pieces: crate::bitboard::mirror_bb(own_pieces),
            enemy_pieces: crate::bitboard::mirror_bb(enemy_pieces),
            rook_queens: crate::bitboard::mirror_bb(rook_queens),
            bishop_queens: crate::bitboard::mirror_bb(bishop_queens),
            pawns_en_passant: crate::bitboard::mirror_bb(pawns),
            own_king: own_king.mirror(),
            enemy_king: enemy_king.mirror(),
            ep_target: ep_absolute.map(Square::mirror),
            castling_rights,
            halfmove_clock,
            fullmove_number,
            ply: 0,
            is_flipped,
            zobrist: 0,
        }
    } else {
        Position {
            own_pieces,
            enemy_pieces,
            rook_queens,
            bishop_queens,
            pawns_en_passant: pawns,
            own_king,
            enemy_king,
            ep_target: ep_absolute,
            castling_rights,
            halfmove_clock,
            fullmove_number,
            ply: 0,
            is_flipped,
            zobrist: 0,
        }
    };

    pos.validate_invariants()
        .map_err(ParseError::InvalidPosition)?;
    pos.zobrist = pos.compute_zobrist_full();
    Ok(pos)
}

type Placement = (u64, u64, u64, u64, u64, Square, Square);

fn parse_placement(field: &str) -> Result<Placement, ParseError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(ParseError::WrongRankCount { found: ranks.len() });
    }

    let mut white_pieces = 0u64;
    let mut black_pieces = 0u64;
    let mut rook_queens = 0u64;
    let mut bishop_queens = 0u64;
    let mut pawns = 0u64;
    let mut white_king = None;
    let mut black_king = None;

    for (i, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - i as u8;
        let mut file = 0u8;
        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file >= 8 {
                return Err(ParseError::BadRankLength {
                    rank: rank + 1,
                    found: file as usize,
                });
            }
            let (piece, color) = CHAR_TO_PC[c as usize].ok_or(ParseError::UnknownPieceChar(c))?;
            let sq = Square::new(file, rank);
            let bit = sq.bit();
            match color {
                Color::White => white_pieces |= bit,
                Color::Black => black_pieces |= bit,
            }
            match piece {
                Piece::Rook => rook_queens |= bit,
                Piece::Bishop => bishop_queens |= bit,
                Piece::Queen => {
                    rook_queens |= bit;
                    bishop_queens |= bit;
                }
                Piece::Pawn => pawns |= bit,
                Piece::King => match color {
                    Color::White => white_king = Some(sq),
                    Color::Black => black_king = Some(sq),
                },
                Piece::Knight => {}
            }
            file += 1;
        }
        if file != 8 {
            return Err(ParseError::BadRankLength {
                rank: rank + 1,
                found: file as usize,
            });
        }
    }

    let white_king = white_king.ok_or_else(|| ParseError::BadPiecePlacement("missing white king".into()))?;
    let black_king = black_king.ok_or_else(|| ParseError::BadPiecePlacement("missing black king".into()))?;

    Ok((
        white_pieces,
        black_pieces,
        rook_queens,
        bishop_queens,
        pawns,
        white_king,
        black_king,
    ))
}

fn parse_castling(field: &str, side: Color) -> Result<(CastleBits, CastleBits), ParseError> {
    if field == "-" {
        return Ok((0, 0));
    }
    let mut white = 0u8;
    let mut black = 0u8;
    for c in field.chars() {
        match c {
            'K' => white |= 0b01,
            'Q' => white |= 0b10,
            'k' => black |= 0b01,
            'q' => black |= 0b10,
            _ => return Err(ParseError::BadCastlingRights(field.to_string())),
        }
    }
    let (own, enemy) = match side {
        Color::White => (white, black),
        Color::Black => (black, white),
    };
    let mut own_bits = 0u8;
    if own & 0b01 != 0 {
        own_bits |= CASTLE_OWN_K;
    }
    if own & 0b10 != 0 {
        own_bits |= CASTLE_OWN_Q;
    }
    let mut enemy_bits = 0u8;
    if enemy & 0b01 != 0 {
        enemy_bits |= CASTLE_ENEMY_K;
    }
    if enemy & 0b10 != 0 {
        enemy_bits |= CASTLE_ENEMY_Q;
    }
    Ok((own_bits, enemy_bits))
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, ParseError> {
    if field == "-" {
        return Ok(None);
    }
    field
        .parse::<Square>()
        .map(Some)
        .map_err(|_| ParseError::BadEnPassantSquare(field.to_string()))
}

pub fn to_fen(pos: &Position) -> String {
    let mut placement = String::with_capacity(64);
    for rank in (0..8u8).rev() {
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let absolute = Square::new(file, rank);
            let internal = if pos.is_flipped { absolute.mirror() } else { absolute };
            match pos.piece_at(internal) {
                Some((color, piece)) => {
                    if empty_run > 0 {
                        placement.push_str(&empty_run.to_string());
                        empty_run = 0;
                    }
                    placement.push(piece.glyph(color));
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            placement.push_str(&empty_run.to_string());
        }
        if rank != 0 {
            placement.push('/');
        }
    }

    let side = pos.side_to_move();
    let side_char = match side {
        Color::White => 'w',
        Color::Black => 'b',
    };

    let (white_k, white_q, black_k, black_q) = match side {
        Color::White => (
            pos.castling_rights & CASTLE_OWN_K != 0,
            pos.castling_rights & CASTLE_OWN_Q != 0,
            pos.castling_rights & CASTLE_ENEMY_K != 0,
            pos.castling_rights & CASTLE_ENEMY_Q != 0,
        ),
        Color::Black => (
            pos.castling_rights & CASTLE_ENEMY_K != 0,
            pos.castling_rights & CASTLE_ENEMY_Q != 0,
            pos.castling_rights & CASTLE_OWN_K != 0,
            pos.castling_rights & CASTLE_OWN_Q != 0,
        ),
    };
    let mut castling = String::new();
    if white_k {
        castling.push('K');
    }
    if white_q {
        castling.push('Q');
    }
    if black_k {
        castling.push('k');
    }
    if black_q {
        castling.push('q');
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let ep = match pos.ep_target {
        Some(sq) => {
            let absolute = if pos.is_flipped { sq.mirror() } else { sq };
            absolute.to_string()
        }
        None => "-".to_string(),
    };

    format!(
        "{placement} {side_char} {castling} {ep} {} {}",
        pos.halfmove_clock, pos.fullmove_number
    )
}

#[allow(dead_code)]
fn unused_glyph_table_reference() -> char {
    PC_TO_CHAR[0]
}
