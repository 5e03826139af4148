//! Error types for the two places text crosses into this engine: FEN parsing
//! and UCI move-text parsing. Both are plain enums over the concrete ways the
//! input can be malformed, not a catch-all string error — callers (the UCI
//! loop, tests) match on variants to report something more specific than
//! "invalid input".

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    WrongFieldCount { found: usize },
    BadPiecePlacement(String),
    WrongRankCount { found: usize },
    BadRankLength { rank: u8, found: usize },
    UnknownPieceChar(char),
    BadSideToMove(String),
    BadCastlingRights(String),
    BadEnPassantSquare(String),
    BadHalfmoveClock(String),
    BadFullmoveNumber(String),
    InvalidPosition(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::WrongFieldCount { found } => {
                write!(f, "FEN must have 6 space-separated fields, found {found}")
            }
            ParseError::BadPiecePlacement(s) => write!(f, "malformed piece placement: {s}"),
            ParseError::WrongRankCount { found } => {
                write!(f, "piece placement must have 8 ranks, found {found}")
            }
            ParseError::BadRankLength { rank, found } => {
                write!(f, "rank {rank} must describe 8 files, found {found}")
            }
            ParseError::UnknownPieceChar(c) => write!(f, "unknown piece character '{c}'"),
            ParseError::BadSideToMove(s) => write!(f, "side to move must be 'w' or 'b', found '{s}'"),
            ParseError::BadCastlingRights(s) => write!(f, "malformed castling rights field: {s}"),
            ParseError::BadEnPassantSquare(s) => write!(f, "malformed en passant field: {s}"),
            ParseError::BadHalfmoveClock(s) => write!(f, "malformed halfmove clock: {s}"),
            ParseError::BadFullmoveNumber(s) => write!(f, "malformed fullmove number: {s}"),
            ParseError::InvalidPosition(s) => write!(f, "position fails invariants: {s}"),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    WrongLength { found: usize },
    BadSquare(String),
    BadPromotion(char),
    NotLegal(String),
}

impl fmt::Display for MoveParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveParseError::WrongLength { found } => {
                write!(f, "UCI move text must be 4 or 5 characters, found {found}")
            }
            MoveParseError::BadSquare(s) => write!(f, "malformed square in move text: {s}"),
            MoveParseError::BadPromotion(c) => write!(f, "unknown promotion character '{c}'"),
            MoveParseError::NotLegal(s) => write!(f, "move is not legal in this position: {s}"),
        }
    }
}

impl std::error::Error for MoveParseError {}
