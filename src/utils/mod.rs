pub mod time_parser;

pub use time_parser::{format_remaining, parse_expire_time};
