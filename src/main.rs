use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ga4_pipeline::config::{load_config, PipelineConfig};
use ga4_pipeline::models::{names, Aggregation, AnalyticsReport, DailyRevenue, DailyUsers};
use ga4_pipeline::services::comparison_service::fetch_period_comparisons;
use ga4_pipeline::services::summary_service::fetch_all_metrics;
use ga4_pipeline::services::trends_service::{aggregate, moving_average};
use ga4_pipeline::utils::{format_currency, format_delta, Table};
use ga4_pipeline::{Ga4Client, Ga4Pipeline};

/// Fetch GA4 users and revenue and emit a dashboard-ready JSON document.
#[derive(Parser, Debug)]
#[command(name = "ga4-pipeline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a JSON config file (default: ./config.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the JSON document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of days to query, ending today
    #[arg(short, long)]
    days: Option<u32>,

    /// Start date (YYYY-MM-DD); overrides --days
    #[arg(long)]
    start_date: Option<String>,

    /// End date (YYYY-MM-DD); defaults to today when --start-date is given
    #[arg(long)]
    end_date: Option<String>,

    /// GA4 property id (numeric)
    #[arg(long)]
    property_id: Option<String>,

    /// Also fetch revenue for the 1 month .. 10 year look-back presets
    #[arg(long)]
    compare_periods: bool,

    /// Print a user/revenue trend table: daily, weekly or monthly
    /// (picked from the range length when the value is omitted)
    #[arg(long, num_args = 0..=1, default_missing_value = "auto", value_parser = parse_trend)]
    trend: Option<TrendArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrendArg {
    Auto,
    Fixed(Aggregation),
}

impl TrendArg {
    fn aggregation(self, days: i64) -> Aggregation {
        match self {
            TrendArg::Auto => Aggregation::optimal_for(days),
            TrendArg::Fixed(aggregation) => aggregation,
        }
    }
}

fn parse_trend(value: &str) -> Result<TrendArg, String> {
    if value.trim().eq_ignore_ascii_case("auto") {
        return Ok(TrendArg::Auto);
    }
    value.parse::<Aggregation>().map(TrendArg::Fixed)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ga4_pipeline=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut layers = load_config(cli.config.as_deref())?;
    if let Some(property_id) = cli.property_id.clone() {
        layers.property_id = Some(property_id);
    }
    if let Some(days) = cli.days {
        layers.date_range_days = Some(days);
    }
    let config = PipelineConfig::from_layers(layers)?;

    let client = Ga4Client::with_base_url(config.access_token.clone(), config.base_url.clone());
    let pipeline = Ga4Pipeline::from_config(client, &config)?;

    info!("Fetching GA4 analytics data...");
    let mut report = fetch_all_metrics(
        &pipeline,
        cli.days,
        cli.start_date.as_deref(),
        cli.end_date.as_deref(),
    )
    .await?;

    if cli.compare_periods {
        report.revenue_comparisons = Some(fetch_period_comparisons(&pipeline).await);
    }

    eprint!("{}", render_summary(&report));
    if let Some(comparisons) = &report.revenue_comparisons {
        eprint!("{}", render_comparisons(comparisons));
    }
    if let Some(trend) = cli.trend {
        let aggregation = trend.aggregation(report.metadata.date_range.days());
        eprint!("{}", render_trend(&report.daily_users, &report.daily_revenue, aggregation));
    }

    let output_json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, output_json)?;
            info!("Results saved to {}", path.display());
        }
        None => println!("{}", output_json),
    }

    Ok(())
}

fn render_summary(report: &AnalyticsReport) -> String {
    let summary = &report.summary;
    let previous = &summary.previous_period;
    let deltas = &summary.deltas;
    let change = |d: Option<f64>| format_delta(d).unwrap_or_else(|| "n/a".to_string());

    let mut table = Table::new(&["Metric", "Current", "Previous", "Change"]);
    table.add_row(vec![
        "Total Users".to_string(),
        summary.total_users.to_string(),
        previous.total_users.to_string(),
        change(deltas.total_users),
    ]);
    table.add_row(vec![
        "Active Users".to_string(),
        summary.active_users.to_string(),
        previous.active_users.to_string(),
        change(deltas.active_users),
    ]);
    table.add_row(vec![
        "Total Revenue".to_string(),
        format_currency(summary.revenue.total_revenue),
        format_currency(previous.revenue.total_revenue),
        change(deltas.total_revenue),
    ]);
    table.add_row(vec![
        "Ad Revenue".to_string(),
        format_currency(summary.revenue.ad_revenue),
        format_currency(previous.revenue.ad_revenue),
        change(deltas.ad_revenue),
    ]);
    table.add_row(vec![
        "In-App Purchases".to_string(),
        format_currency(summary.revenue.in_app_purchase_revenue),
        format_currency(previous.revenue.in_app_purchase_revenue),
        change(deltas.in_app_purchase_revenue),
    ]);
    table.add_row(vec![
        "Session Duration".to_string(),
        format!("{:.1} min", summary.session_duration_minutes),
        String::new(),
        String::new(),
    ]);
    table.add_row(vec![
        "ARPU".to_string(),
        format_currency(summary.arpu),
        String::new(),
        String::new(),
    ]);

    format!("GA4 property {} ({})\n{}", report.metadata.property_id, report.metadata.date_range, table.render())
}

fn render_comparisons(comparisons: &[ga4_pipeline::models::PeriodComparison]) -> String {
    let mut table = Table::new(&["Period", "Total", "Ad", "In-App"]);
    for comparison in comparisons {
        match (&comparison.revenue, &comparison.error) {
            (Some(revenue), _) => table.add_row(vec![
                comparison.label.clone(),
                format_currency(revenue.total_revenue),
                format_currency(revenue.ad_revenue),
                format_currency(revenue.in_app_purchase_revenue),
            ]),
            (None, error) => table.add_row(vec![
                comparison.label.clone(),
                format!("error: {}", error.as_deref().unwrap_or("unknown").lines().next().unwrap_or_default()),
                String::new(),
                String::new(),
            ]),
        }
    }
    format!("\nRevenue by period\n{}", table.render())
}

fn render_trend(users: &[DailyUsers], revenue: &[DailyRevenue], aggregation: Aggregation) -> String {
    let user_points = aggregate(&DailyUsers::series(users, names::TOTAL_USERS), aggregation);
    let revenue_points = aggregate(&DailyRevenue::series(revenue, names::TOTAL_REVENUE), aggregation);
    let user_values: Vec<f64> = user_points.iter().map(|p| p.value).collect();
    let smoothed = moving_average(&user_values);

    let mut table = Table::new(&["Period", "Total Users", "Users (avg)", "Revenue"]);
    for (i, point) in user_points.iter().enumerate() {
        let revenue = revenue_points
            .iter()
            .find(|r| r.date == point.date)
            .map(|r| r.value)
            .unwrap_or(0.0);
        table.add_row(vec![
            point.date.to_string(),
            format!("{:.0}", point.value),
            format!("{:.1}", smoothed[i]),
            format_currency(revenue),
        ]);
    }
    format!("\nTrend ({:?})\n{}", aggregation, table.render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_flag_values() {
        let cli = Cli::try_parse_from(["ga4-pipeline"]).unwrap();
        assert_eq!(cli.trend, None);

        let cli = Cli::try_parse_from(["ga4-pipeline", "--trend"]).unwrap();
        assert_eq!(cli.trend, Some(TrendArg::Auto));
        assert_eq!(TrendArg::Auto.aggregation(30), Aggregation::Daily);
        assert_eq!(TrendArg::Auto.aggregation(365), Aggregation::Monthly);

        let cli = Cli::try_parse_from(["ga4-pipeline", "--trend", "weekly"]).unwrap();
        assert_eq!(cli.trend, Some(TrendArg::Fixed(Aggregation::Weekly)));
    }

    #[test]
    fn test_unknown_trend_rejected_at_parse_time() {
        let err = Cli::try_parse_from(["ga4-pipeline", "--trend", "hourly"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
