pub mod config;
pub mod load;
pub mod schema;

pub use load::run_load;
pub use schema::show_schema;
