pub mod config;
pub mod prepare;
pub mod report;
pub mod serve;
pub mod weeks;
