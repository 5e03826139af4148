//! Move representation, generation, and application (§4.2–§4.4): magic
//! bitboard sliding attacks, pseudo-legal generation over the mirrored
//! position, the pin-accelerated legality filter, move application, and
//! perft as the whole pipeline's correctness oracle.

pub mod attacks;
pub mod execute;
pub mod legality;
pub mod magic;
pub mod movegen;
pub mod perft;
pub mod square_control;
pub mod types;
