pub mod accumulator;
pub mod context;
pub mod eval;
pub mod ordering;
pub mod pesto;
pub mod picker;
pub mod repetition;
pub mod search;
pub mod see;
pub mod tt;
