//! Magic-bitboard sliding attacks: precomputed per-square multiply-and-shift
//! tables for rook and bishop attacks (queen attacks are their union).
//!
//! `structs` holds the runtime lookup tables, `attacks` is the plain
//! ray-scanning oracle used both to build those tables and to check them in
//! tests, `search` finds magic numbers for a given relevant-occupancy mask,
//! `precompute` drives the full per-square search via Carry-Rippler subset
//! enumeration, and `loader` is the single startup entry point the CLI and
//! the rest of the crate call to get a `MagicTables` instance.

pub mod attacks;
pub mod loader;
pub mod precompute;
pub mod search;
pub mod structs;

pub use structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};
