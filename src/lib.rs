pub mod build;
pub mod common;
pub mod config;
pub mod generate_commands;
pub mod site;
pub mod tag;
pub mod tool;
