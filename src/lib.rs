pub mod catalog;
pub mod config;
pub mod epg;
pub mod errors;
pub mod models;
pub mod registry;
pub mod sources;
pub mod utils;
pub mod xmltv;
