pub mod align;
pub mod cluster;
pub mod config;
pub mod matrix;
