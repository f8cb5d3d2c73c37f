// Services that sit between chat commands, market data and the indicator engine
pub mod command;
pub mod report;

pub use command::{parse_command, Command, ReportRequest};
pub use report::{MarketReport, ReportService};
