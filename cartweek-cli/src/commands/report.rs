//! `cartweek report`: week-over-week report for one selected week

use std::path::PathBuf;

use anyhow::Result;
use cartweek_core::{DashboardLoader, MetricCard, WeekId, WeekReport};
use clap::Args;
use comfy_table::{
    Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED,
};

use crate::config::ConfigLoader;

/// Arguments for the report command
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Data directory written by `cartweek prepare`
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Week id `<end>_<first_day>`; defaults to the newest week with a report
    #[arg(short, long)]
    pub week: Option<WeekId>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the report command
pub fn run(args: ReportArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let data_dir = config.data_dir(args.data_dir);
    let loader =
        DashboardLoader::new(data_dir.processed(), data_dir.raw()).with_config(config.dashboard);

    let week = match args.week {
        Some(week) => week,
        None => loader.default_week()?,
    };
    let report = loader.report(&week)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&*report)?);
    } else {
        println!("{}", render(&report));
    }
    Ok(())
}

fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        header
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

fn number(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn format_delta(delta: Option<f64>) -> String {
    match delta {
        Some(delta) => format!("{:+.1}%", delta * 100.0),
        None => "n/a".to_string(),
    }
}

fn delta_cell(delta: Option<f64>) -> Cell {
    let color = match delta {
        Some(d) if d > 0.0 => Color::Green,
        Some(d) if d < 0.0 => Color::Red,
        _ => Color::Reset,
    };
    Cell::new(format_delta(delta))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

fn metric_row(label: &str, card: &MetricCard, decimals: usize) -> Vec<Cell> {
    vec![
        Cell::new(label),
        number(format!("{:.*}", decimals, card.current)),
        number(format!("{:.*}", decimals, card.previous)),
        delta_cell(card.relative_delta),
    ]
}

fn render(report: &WeekReport) -> String {
    let mut out = format!(
        "Week {} compared with {}\n\n",
        report.week, report.previous_week
    );

    let mut metrics = table(&["Metric", "This week", "Previous week", "Change"]);
    metrics.add_row(metric_row("Users", &report.users, 0));
    metrics.add_row(metric_row("Orders", &report.orders, 0));
    metrics.add_row(metric_row("New users", &report.new_users, 0));
    metrics.add_row(metric_row("Avg basket size", &report.basket_size, 2));
    metrics.add_row(metric_row(
        "Avg days between orders",
        &report.days_between_orders,
        2,
    ));
    out.push_str(&format!("{metrics}\n"));

    match report.active_users_pct {
        Some(pct) => out.push_str(&format!("Active users retained: {pct:.1}%\n\n")),
        None => out.push_str("Active users retained: n/a\n\n"),
    }

    let mut daily = table(&["Day", "Date", "Orders", "Previous week"]);
    for day in &report.daily_orders {
        daily.add_row(vec![
            Cell::new(&day.weekday),
            Cell::new(day.date),
            number(day.current),
            number(day.previous),
        ]);
    }
    out.push_str(&format!("{daily}\n\n"));

    let mut hours = table(&["Time of day", "Orders", "Previous week"]);
    for bucket in &report.time_of_day {
        hours.add_row(vec![
            Cell::new(&bucket.label),
            number(bucket.current),
            number(bucket.previous),
        ]);
    }
    out.push_str(&format!("{hours}\n\n"));

    let mut departments = table(&["Department", "Items"]);
    for share in &report.top_departments {
        departments.add_row(vec![Cell::new(&share.department), number(share.occurrences)]);
    }
    out.push_str(&format!("{departments}\n\n"));

    let mut aisles = table(&["Aisle", "Items", "Previous week"]);
    for aisle in &report.top_aisles {
        aisles.add_row(vec![
            Cell::new(&aisle.aisle),
            number(aisle.current),
            number(aisle.previous),
        ]);
    }
    out.push_str(&format!("{aisles}\n\n"));

    let mut sales = table(&["Week ending", "Orders", "Items"]);
    for week in &report.weekly_sales {
        sales.add_row(vec![
            Cell::new(week.week_ending),
            number(week.orders),
            number(week.items),
        ]);
    }
    out.push_str(&sales.to_string());
    out
}
