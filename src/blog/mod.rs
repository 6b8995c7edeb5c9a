pub mod audit;
pub mod config;
pub mod content;
pub mod detail;
pub mod index;
pub mod lock;
pub mod manager;
pub mod paths;
pub mod render;
pub mod util;
pub mod warn;
