//! Library crate for lab-nmap-rs: whitelisted nmap command building,
//! bounded subprocess execution, output parsing and the JSON API.
pub mod command;
pub mod config;
pub mod error;
pub mod options;
pub mod parser;
pub mod scanner;
pub mod server;
pub mod toolcheck;
pub mod types;
