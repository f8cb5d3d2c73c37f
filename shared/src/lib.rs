// Data models shared by the indicator engine and anything rendering its output.
pub mod models;
pub mod utils;
