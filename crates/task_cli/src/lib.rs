pub mod cli;
pub mod filter;
pub mod render;
