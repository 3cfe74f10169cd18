//! Command handlers. Each translates parsed arguments into core calls and
//! prints the result; no generation logic lives here.

pub mod generate;
