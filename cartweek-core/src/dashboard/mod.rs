//! Dashboard data: week catalog, cached loading and week-over-week reports

mod catalog;
mod loader;
mod report;
mod time_of_day;

pub use catalog::WeekCatalog;
pub use loader::DashboardLoader;
pub use report::{
    AisleComparison, DailyOrders, DashboardConfig, DepartmentShare, MetricCard,
    OTHER_DEPARTMENTS, ReportInputs, TimeOfDayOrders, WeekReport, WeeklySales,
};
pub use time_of_day::TimeOfDay;
