pub mod annotations;
pub mod cli;
pub mod color;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod render;
pub mod report;
pub mod toolchain;
