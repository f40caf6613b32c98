pub mod errors;
pub mod finding;
pub mod manager;
pub mod pulse;
pub mod rolling_window;
pub mod sink;
pub mod types;
