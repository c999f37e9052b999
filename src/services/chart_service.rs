use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use plotters::prelude::*;
use tracing::info;

use crate::models::{PriceObservation, TrendResult};
use crate::services::trend_service::{sorted_history, TREND_WINDOW_DAYS};
use crate::utils::AppError;

pub const CHART_WIDTH: u32 = 1024;
pub const CHART_HEIGHT: u32 = 576;

/// File name for a product's chart inside the chart directory
pub fn chart_path(dir: &Path, product_id: &str) -> PathBuf {
    let safe_id: String = product_id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    dir.join(format!("bazaar_trend_{}.png", safe_id))
}

/// Render a product's price history as a PNG line chart
///
/// The caption carries the 7-day trend. Needs at least two observations.
pub fn render_trend_chart(
    title: &str,
    observations: &[PriceObservation],
    trend: &TrendResult,
    path: &Path,
) -> Result<PathBuf, AppError> {
    let points = sorted_history(observations);

    if points.len() < 2 {
        return Err(AppError::InvalidInput(
            "Not enough price data to draw a chart (minimum 2 observations required).".to_string(),
        ));
    }

    let min_price = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let max_price = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let padding = (max_price - min_price).max(1.0) * 0.1;
    let y_min = (min_price - padding).max(0.0);
    let y_max = max_price + padding;

    let x_min = points[0].date;
    let mut x_max = points[points.len() - 1].date;
    if x_max <= x_min {
        x_max = x_min + Duration::days(1);
    }

    {
        let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| AppError::Chart(format!("Failed to fill canvas: {}", e)))?;

        let caption = format!(
            "{} ({} over {} days)",
            title,
            trend.signed_percent(),
            TREND_WINDOW_DAYS
        );
        let mut chart = ChartBuilder::on(&root)
            .caption(caption, ("sans-serif", 32.0).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| AppError::Chart(format!("Failed to build chart: {}", e)))?;

        chart
            .configure_mesh()
            .x_desc("Date")
            .y_desc("Price")
            .x_label_formatter(&|d: &DateTime<Utc>| d.format("%b %-d").to_string())
            .draw()
            .map_err(|e| AppError::Chart(format!("Failed to draw mesh: {}", e)))?;

        let line_color = if trend.is_positive { GREEN } else { RED };

        chart
            .draw_series(LineSeries::new(
                points.iter().map(|p| (p.date, p.price)),
                line_color.stroke_width(3),
            ))
            .map_err(|e| AppError::Chart(format!("Failed to draw line: {}", e)))?;

        chart
            .draw_series(
                points
                    .iter()
                    .map(|p| Circle::new((p.date, p.price), 4, line_color.filled())),
            )
            .map_err(|e| AppError::Chart(format!("Failed to draw points: {}", e)))?;

        root.present()
            .map_err(|e| AppError::Chart(format!("Failed to render chart: {}", e)))?;
    }

    info!("Rendered trend chart for '{}' to {}", title, path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_path_sanitises_id() {
        let path = chart_path(Path::new("/tmp"), "../66a1/x");
        assert_eq!(path, PathBuf::from("/tmp/bazaar_trend_66a1x.png"));
    }

    #[test]
    fn test_requires_two_points() {
        let single = vec![PriceObservation::parse("2024-01-01", "10").unwrap()];
        let result = render_trend_chart(
            "Onion",
            &single,
            &TrendResult::empty(),
            Path::new("/tmp/never_written.png"),
        );
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }
}
