pub mod macros;
pub mod confirm;
pub mod output;
