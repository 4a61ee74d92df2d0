pub mod args;
pub mod cleaning;
pub mod config;
pub mod fbref;
pub mod fetch;
pub mod http_cache;
pub mod http_client;
pub mod table;
pub mod trends;
