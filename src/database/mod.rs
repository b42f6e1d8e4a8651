pub mod client;
pub mod repositories;
pub mod surrdb_utils;
pub mod table_names;
