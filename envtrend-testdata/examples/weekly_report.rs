//! Example: a week of synthetic station data summarized.
//!
//! Run with: cargo run -p envtrend-testdata --example weekly_report

use envtrend::{AnalyticsEngine, TimeRange};
use envtrend_testdata::{create_station_sensors, generate_station, GeneratorConfig, StationScenario};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GeneratorConfig::new()
        .with_duration_days(7.0)
        .with_seed(42)
        .with_dropouts(0.02)
        .with_location("Ettimadai");
    let sensors = create_station_sensors(StationScenario::GasLeak { at_sample: 1000 });
    let dataset = generate_station(&config, &sensors)?;

    let engine = AnalyticsEngine::default();
    let series = engine.series(dataset.into_records())?;

    println!("Weekly station report");
    println!("=====================\n");
    println!("{} readings over {} days\n", series.len(), series.dates().len());

    let report = engine.trend(&series, TimeRange::Week)?;
    for line in engine.describe_trend(&report) {
        println!("  {}", line);
    }

    println!("\nDaily averages:");
    for bucket in engine.daily(&series) {
        let temp = bucket.attribute("temperature").map(|s| s.avg).unwrap_or(f64::NAN);
        let hum = bucket.attribute("humidity").map(|s| s.avg).unwrap_or(f64::NAN);
        println!(
            "  {}  {:>4} readings  {:>6.1}°C  {:>5.1}%",
            bucket.date, bucket.reading_count, temp, hum
        );
    }

    println!("\nBest fit for pressure:");
    let fit = engine.best_regression(&series, "pressure")?;
    println!("  {} (R² = {:.3}, {})", fit.equation, fit.r_squared, fit.strength.as_str());

    let alerts = engine.alerts(&series);
    if alerts.is_empty() {
        println!("\nNo alerts.");
    } else {
        println!("\nAlerts:");
        for alert in alerts {
            println!("  [{}] {}", alert.severity.as_str(), alert.message);
        }
    }

    Ok(())
}
