//! UCI front end. The core exposes a `Position` that is always mirrored to
//! the mover's own-up perspective; everything in this file exists to
//! translate across that boundary — FEN/move text in canonical (White-on-
//! bottom) coordinates on the way in, `bestmove` text mirrored back out —
//! and to drive the core's iterative-deepening search from a background
//! thread so `stop` can interrupt it via the polled `StopFlag` the core
//! exposes. Exactly six commands are handled: `uci`, `isready`,
//! `ucinewgame`, `position`, `go`, `stop`, `quit`.

use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arrayvec::ArrayVec;
use vantage::board::{Piece, Position};
use vantage::errors::MoveParseError;
use vantage::moves::legality::generate_legal;
use vantage::moves::execute::apply;
use vantage::moves::magic::loader::load_magic_tables;
use vantage::moves::magic::MagicTables;
use vantage::moves::types::Move;
use vantage::search::context::SearchContext;
use vantage::search::search::{search, StopFlag};
use vantage::search::tt::TranspositionTable;
use vantage::square::Square;

const ENGINE_NAME: &str = "Vantage 1.3";
const ENGINE_AUTHOR: &str = "Vaishak Menon";
const DEFAULT_DEPTH: i32 = 8;
const DEFAULT_TT_SIZE_MB: usize = 64;

type SearchOutcome = (SearchContext, TranspositionTable);

struct RunningSearch {
    handle: JoinHandle<SearchOutcome>,
    stop: StopFlag,
}

struct Engine {
    tables: Arc<MagicTables>,
    position: Position,
    ctx: Option<SearchContext>,
    tt: Option<TranspositionTable>,
    running: Option<RunningSearch>,
}

impl Engine {
    fn new() -> Self {
        Self {
            tables: Arc::new(load_magic_tables()),
            position: Position::new_game(),
            ctx: Some(SearchContext::new()),
            tt: Some(TranspositionTable::new(DEFAULT_TT_SIZE_MB)),
            running: None,
        }
    }

    /// Blocks until any in-flight search finishes, folding its updated
    /// context/table back in. Every command other than `go`/`stop` needs
    /// exclusive access to `ctx`/`tt`, so they all join through this first.
    fn join_running(&mut self) {
        if let Some(running) = self.running.take() {
            running.stop.request_stop();
            let (ctx, tt) = running.handle.join().expect("search thread panicked");
            self.ctx = Some(ctx);
            self.tt = Some(tt);
        }
    }

    fn new_game(&mut self) {
        self.join_running();
        if let Some(tt) = self.tt.as_mut() {
            tt.clear();
        }
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.new_game();
        }
        self.position = Position::new_game();
    }

    fn set_position(&mut self, parts: &[&str]) {
        self.join_running();

        let mut rest_idx;
        let mut pos = match parts.first() {
            Some(&"startpos") => {
                rest_idx = 1;
                Position::new_game()
            }
            Some(&"fen") => {
                let fen_end = parts[1..]
                    .iter()
                    .position(|&p| p == "moves")
                    .map(|i| i + 1)
                    .unwrap_or(parts.len());
                let fen = parts[1..fen_end].join(" ");
                rest_idx = fen_end;
                match Position::from_str(&fen) {
                    Ok(p) => p,
                    Err(e) => {
                        println!("info string bad fen: {e}");
                        return;
                    }
                }
            }
            _ => return,
        };

        if rest_idx < parts.len() && parts[rest_idx] == "moves" {
            rest_idx += 1;
            for move_text in &parts[rest_idx..] {
                match parse_uci_move(&pos, move_text, &self.tables) {
                    Ok(mv) => {
                        let (next, _) = apply(&pos, mv);
                        pos = next;
                    }
                    Err(e) => {
                        println!("info string illegal move {move_text}: {e}");
                        return;
                    }
                }
            }
        }

        self.position = pos;
    }

    fn go(&mut self, parts: &[&str]) {
        if self.running.is_some() {
            println!("info string search already running, ignoring go");
            return;
        }

        let mut depth = DEFAULT_DEPTH;
        let mut i = 0;
        while i < parts.len() {
            if parts[i] == "depth" {
                if let Some(d) = parts.get(i + 1).and_then(|s| s.parse::<i32>().ok()) {
                    depth = d;
                }
                i += 2;
            } else {
                i += 1;
            }
        }

        let Some(mut ctx) = self.ctx.take() else { return };
        let Some(mut tt) = self.tt.take() else { return };
        let position = self.position;
        let is_flipped = position.is_flipped;
        let tables = Arc::clone(&self.tables);
        let stop = StopFlag::new();
        let stop_for_thread = stop.clone();

        let handle = thread::spawn(move || {
            let (_, best_move) = search(&position, &tables, &mut ctx, &mut tt, depth, &stop_for_thread);
            let text = match best_move {
                Some(mv) => mirror_uci(mv, is_flipped),
                None => "0000".to_string(),
            };
            println!("bestmove {text}");
            io::stdout().flush().ok();
            (ctx, tt)
        });

        self.running = Some(RunningSearch { handle, stop });
    }

    fn stop(&mut self) {
        if let Some(running) = self.running.as_ref() {
            running.stop.request_stop();
        }
        self.join_running();
    }
}

fn main() {
    let mut engine = Engine::new();
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts[0] {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                println!("uciok");
                io::stdout().flush().ok();
            }
            "isready" => {
                println!("readyok");
                io::stdout().flush().ok();
            }
            "ucinewgame" => engine.new_game(),
            "position" => engine.set_position(&parts[1..]),
            "go" => engine.go(&parts[1..]),
            "stop" => engine.stop(),
            "quit" => {
                engine.stop();
                break;
            }
            _ => {}
        }
    }
}

/// Mirrors a move's squares into canonical (White-on-bottom) coordinates
/// before printing, undoing the internal own-up perspective the position
/// was generated from.
fn mirror_uci(mv: Move, is_flipped: bool) -> String {
    if !is_flipped {
        return mv.to_uci();
    }
    let from = mv.from.mirror();
    let to = mv.to.mirror();
    let promo = match mv.promotion {
        Some(Piece::Queen) => "q",
        Some(Piece::Rook) => "r",
        Some(Piece::Bishop) => "b",
        Some(Piece::Knight) => "n",
        _ => "",
    };
    format!("{from}{to}{promo}")
}

/// Parses UCI move text in canonical coordinates, mirrors it into the
/// position's own-up frame if needed, and matches it against the position's
/// actual legal moves so castling/en-passant/promotion flags come from the
/// move generator rather than being reconstructed from the bare squares.
fn parse_uci_move(pos: &Position, text: &str, tables: &MagicTables) -> Result<Move, MoveParseError> {
    if text.len() != 4 && text.len() != 5 {
        return Err(MoveParseError::WrongLength { found: text.len() });
    }

    let from_text = &text[0..2];
    let to_text = &text[2..4];
    let mut from = Square::from_str(from_text).map_err(|_| MoveParseError::BadSquare(from_text.to_string()))?;
    let mut to = Square::from_str(to_text).map_err(|_| MoveParseError::BadSquare(to_text.to_string()))?;

    let promotion = if text.len() == 5 {
        let c = text.as_bytes()[4] as char;
        Some(match c {
            'q' => Piece::Queen,
            'r' => Piece::Rook,
            'b' => Piece::Bishop,
            'n' => Piece::Knight,
            _ => return Err(MoveParseError::BadPromotion(c)),
        })
    } else {
        None
    };

    if pos.is_flipped {
        from = from.mirror();
        to = to.mirror();
    }

    let mut legal: ArrayVec<Move, 256> = ArrayVec::new();
    let mut scratch: ArrayVec<Move, 256> = ArrayVec::new();
    generate_legal(pos, tables, &mut legal, &mut scratch);

    legal
        .into_iter()
        .find(|m| m.from == from && m.to == to && m.promotion == promotion)
        .ok_or_else(|| MoveParseError::NotLegal(text.to_string()))
}
