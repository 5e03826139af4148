//! Single startup entry point for acquiring a `MagicTables` instance. Behind
//! the `load_magic` feature this deserializes a `bincode`-encoded table from
//! disk (falling back to generation if the file is missing or corrupt);
//! otherwise it always searches for fresh magic numbers at startup. The
//! `deterministic_magic` feature pins the search to a fixed seed so CI and
//! local runs see identical magic numbers and attack tables.

use super::precompute::{generate_magic_tables, MagicTableSeed};
use super::structs::MagicTables;

#[cfg(feature = "deterministic_magic")]
const MAGIC_SEED: u64 = 0xD6E8_FEB8_6659_FD93;

const MAGIC_TABLE_PATH: &str = "magic_tables.bin";

fn seed() -> MagicTableSeed {
    #[cfg(feature = "deterministic_magic")]
    {
        MagicTableSeed::Fixed(MAGIC_SEED)
    }
    #[cfg(not(feature = "deterministic_magic"))]
    {
        MagicTableSeed::Random
    }
}

fn generate() -> MagicTables {
    generate_magic_tables(seed()).expect("magic number search failed — bad magic search parameters")
}

#[cfg(feature = "load_magic")]
fn load_from_disk() -> Option<MagicTables> {
    let bytes = std::fs::read(MAGIC_TABLE_PATH).ok()?;
    bincode::deserialize(&bytes).ok()
}

/// The single entry point the CLI binary (and anything else needing slider
/// attacks) calls at startup.
pub fn load_magic_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        if let Some(tables) = load_from_disk() {
            return tables;
        }
    }
    generate()
}
