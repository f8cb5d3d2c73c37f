// Market data adapters: everything that turns provider payloads into ordered bars
pub mod bybit;
pub mod csv_parser;
pub mod market_data;
pub mod validation;
