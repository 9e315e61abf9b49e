pub mod args;
pub mod autocomplete;
pub mod commands;
pub mod demo;
pub mod table;
