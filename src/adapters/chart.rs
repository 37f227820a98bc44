//! SVG line chart of history plus forecast.

use crate::core::ChartRenderer;
use crate::domain::model::{ForecastResult, Subseries};
use crate::utils::error::{ForecastError, Result};
use chrono::NaiveDate;

const BACKGROUND: &str = "#1E1E1E";
const HISTORY_COLOR: &str = "#00BFFF";
const FORECAST_COLOR: &str = "#FF69B4";
const MARGIN: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
        }
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

struct Scale {
    first_day: NaiveDate,
    day_span: f64,
    min_value: f64,
    value_span: f64,
    plot_width: f64,
    plot_height: f64,
}

impl Scale {
    fn point(&self, date: NaiveDate, value: f64) -> (f64, f64) {
        let days = (date - self.first_day).num_days() as f64;
        let x = MARGIN + days / self.day_span * self.plot_width;
        let y = MARGIN + self.plot_height - (value - self.min_value) / self.value_span * self.plot_height;
        (x, y)
    }

    fn polyline(&self, points: impl Iterator<Item = (NaiveDate, f64)>) -> String {
        points
            .map(|(date, value)| {
                let (x, y) = self.point(date, value);
                format!("{:.1},{:.1}", x, y)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, history: &Subseries, forecast: &ForecastResult) -> Result<Vec<u8>> {
        let series: Vec<(NaiveDate, f64)> = history
            .records()
            .iter()
            .map(|r| (r.date, r.sales))
            .chain(forecast.points.iter().map(|p| (p.date, p.predicted_sales)))
            .collect();

        if series.iter().any(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::ProcessingError {
                message: "Cannot chart non-finite sales values".to_string(),
            });
        }

        let first_day = series.iter().map(|(d, _)| *d).min();
        let last_day = series.iter().map(|(d, _)| *d).max();
        let (Some(first_day), Some(last_day)) = (first_day, last_day) else {
            return Err(ForecastError::ProcessingError {
                message: "Nothing to chart".to_string(),
            });
        };

        let min_value = series.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
        let max_value = series.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

        let width = self.width as f64;
        let height = self.height as f64;
        let scale = Scale {
            first_day,
            day_span: ((last_day - first_day).num_days() as f64).max(1.0),
            min_value,
            value_span: (max_value - min_value).max(1.0),
            plot_width: width - 2.0 * MARGIN,
            plot_height: height - 2.0 * MARGIN,
        };

        let history_line = scale.polyline(history.records().iter().map(|r| (r.date, r.sales)));
        let forecast_line = scale.polyline(
            forecast
                .points
                .iter()
                .map(|p| (p.date, p.predicted_sales)),
        );

        let title = escape_xml(&format!(
            "Forecasted Sales: {} / {}",
            history.store_id(),
            history.product_id()
        ));

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = self.width,
            h = self.height
        ));
        svg.push_str(&format!(
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>\n",
            BACKGROUND
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"30\" fill=\"white\" font-size=\"16\" text-anchor=\"middle\">{}</text>\n",
            width / 2.0,
            title
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" fill=\"white\" font-size=\"11\">{} .. {}</text>\n",
            MARGIN,
            height - 15.0,
            first_day.format("%Y-%m-%d"),
            last_day.format("%Y-%m-%d")
        ));
        svg.push_str(&format!(
            "<text x=\"10\" y=\"{:.1}\" fill=\"white\" font-size=\"11\">{:.0}</text>\n",
            MARGIN,
            max_value
        ));
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" points=\"{}\"><title>Historical Sales</title></polyline>\n",
            HISTORY_COLOR, history_line
        ));
        svg.push_str(&format!(
            "<polyline fill=\"none\" stroke=\"{}\" stroke-width=\"2\" stroke-dasharray=\"6,4\" points=\"{}\"><title>Forecasted Sales</title></polyline>\n",
            FORECAST_COLOR, forecast_line
        ));
        svg.push_str("</svg>\n");

        Ok(svg.into_bytes())
    }
}
