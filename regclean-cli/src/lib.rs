// Progress lines go to stderr so stdout carries only the report.
#![allow(clippy::print_stderr)]

pub mod cli;
pub mod console;
pub mod logging;
pub mod snapshot;
