//! Move-generation correctness oracle (§8 "Perft"): leaf counts at fixed
//! depths from three named positions, checked against known-good values.
//! These three positions between them exercise castling, en passant,
//! promotion, and pinned/discovered-check play, which is why the perft
//! literature settled on them as a generator's acceptance test.

use std::str::FromStr;
use vantage::board::Position;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::moves::perft::perft;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -";
const POSITION_3_FEN: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - -";

#[test]
fn startpos_perft_1_is_20() {
    let tables = load_magic_tables();
    let pos = Position::from_str(START_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 1), 20);
}

#[test]
fn startpos_perft_2_is_400() {
    let tables = load_magic_tables();
    let pos = Position::from_str(START_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 2), 400);
}

#[test]
fn startpos_perft_3_is_8902() {
    let tables = load_magic_tables();
    let pos = Position::from_str(START_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 3), 8_902);
}

#[test]
fn startpos_perft_4_is_197281() {
    let tables = load_magic_tables();
    let pos = Position::from_str(START_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 4), 197_281);
}

#[test]
#[ignore] // several seconds; run with --ignored
fn startpos_perft_5_is_4865609() {
    let tables = load_magic_tables();
    let pos = Position::from_str(START_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 5), 4_865_609);
}

#[test]
fn kiwipete_perft_1_is_48() {
    let tables = load_magic_tables();
    let pos = Position::from_str(KIWIPETE_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 1), 48);
}

#[test]
fn kiwipete_perft_2_is_2039() {
    let tables = load_magic_tables();
    let pos = Position::from_str(KIWIPETE_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 2), 2_039);
}

#[test]
#[ignore] // tens of seconds; run with --ignored
fn kiwipete_perft_4_is_4085603() {
    let tables = load_magic_tables();
    let pos = Position::from_str(KIWIPETE_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 4), 4_085_603);
}

#[test]
fn position_3_perft_1_is_14() {
    let tables = load_magic_tables();
    let pos = Position::from_str(POSITION_3_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 1), 14);
}

#[test]
fn position_3_perft_2_is_191() {
    let tables = load_magic_tables();
    let pos = Position::from_str(POSITION_3_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 2), 191);
}

#[test]
#[ignore] // tens of seconds; run with --ignored
fn position_3_perft_5_is_674624() {
    let tables = load_magic_tables();
    let pos = Position::from_str(POSITION_3_FEN).unwrap();
    assert_eq!(perft(&pos, &tables, 5), 674_624);
}
