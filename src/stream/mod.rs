//! Agent run event stream processing

mod accumulator;
mod activity;
mod config;
mod hooks;
mod parser;
mod processor;
mod types;


pub use activity::*;
pub use config::*;
pub use hooks::*;
pub use parser::*;
pub use processor::*;
pub use types::*;
