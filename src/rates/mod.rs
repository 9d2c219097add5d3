pub mod parser;
pub mod ratio;

pub use parser::RateTableParser;
pub use ratio::{format_ratio, rate_ratio, round_significant};
