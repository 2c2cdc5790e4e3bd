pub mod db_connect;
pub mod env;
pub mod progress_bars;
pub mod resolution_config;
