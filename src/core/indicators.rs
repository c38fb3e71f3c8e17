use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{SimulationError, SimulationResult};

pub const VOLUME_SHORT_WINDOW: usize = 20;
pub const VOLUME_LONG_WINDOW: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

/// Daily closes for one ticker, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: &str, points: Vec<PricePoint>) -> SimulationResult<Self> {
        let series = Self {
            ticker: ticker.trim().to_uppercase(),
            points,
        };
        series.validate()?;
        Ok(series)
    }

    /// Rejects empty series, non-finite closes and dates that are not strictly ascending.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.points.is_empty() {
            return Err(SimulationError::invalid(
                "points",
                format!("series for {} is empty", self.ticker),
            ));
        }

        if let Some(point) = self.points.iter().find(|p| !p.close.is_finite()) {
            return Err(SimulationError::invalid(
                "close",
                format!("{} close on {} is not finite", self.ticker, point.date),
            ));
        }

        if let Some(pair) = self.points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(SimulationError::invalid(
                "points",
                format!(
                    "{} dates must be strictly ascending: {} follows {}",
                    self.ticker, pair[1].date, pair[0].date
                ),
            ));
        }

        Ok(())
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn volumes(&self) -> Vec<u64> {
        self.points.iter().map(|p| p.volume).collect()
    }
}

/// Trailing return windows, in trading days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnWindow {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "5D")]
    FiveDays,
    #[serde(rename = "2W")]
    TwoWeeks,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
}

impl ReturnWindow {
    pub const ALL: [ReturnWindow; 7] = [
        ReturnWindow::OneDay,
        ReturnWindow::FiveDays,
        ReturnWindow::TwoWeeks,
        ReturnWindow::OneMonth,
        ReturnWindow::ThreeMonths,
        ReturnWindow::SixMonths,
        ReturnWindow::OneYear,
    ];

    pub fn trading_days(self) -> usize {
        match self {
            ReturnWindow::OneDay => 1,
            ReturnWindow::FiveDays => 5,
            ReturnWindow::TwoWeeks => 10,
            ReturnWindow::OneMonth => 21,
            ReturnWindow::ThreeMonths => 63,
            ReturnWindow::SixMonths => 126,
            ReturnWindow::OneYear => 252,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReturnWindow::OneDay => "1D",
            ReturnWindow::FiveDays => "5D",
            ReturnWindow::TwoWeeks => "2W",
            ReturnWindow::OneMonth => "1M",
            ReturnWindow::ThreeMonths => "3M",
            ReturnWindow::SixMonths => "6M",
            ReturnWindow::OneYear => "1Y",
        }
    }
}

/// Outcome of one indicator. Missing history is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reading {
    Value { value: f64 },
    InsufficientHistory { required: usize, available: usize },
    /// The denominator (base close or long-window volume) was zero.
    ZeroBase,
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Value { value } => Some(value),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReturn {
    pub window: ReturnWindow,
    pub trading_days: usize,
    pub reading: Reading,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSnapshot {
    pub ticker: String,
    pub as_of: NaiveDate,
    pub last_close: f64,
    pub returns: Vec<WindowReturn>,
    pub volume_momentum: Reading,
}

impl IndicatorSnapshot {
    pub fn return_for(&self, window: ReturnWindow) -> Reading {
        self.returns
            .iter()
            .find(|r| r.window == window)
            .map_or(
                Reading::InsufficientHistory {
                    required: window.trading_days() + 1,
                    available: 0,
                },
                |r| r.reading,
            )
    }
}

/// `close[last] / close[last - days] - 1`.
pub fn trailing_return(closes: &[f64], days: usize) -> Reading {
    let available = closes.len();
    if available <= days {
        return Reading::InsufficientHistory {
            required: days + 1,
            available,
        };
    }

    let latest = closes[available - 1];
    let base = closes[available - 1 - days];
    if base == 0.0 {
        return Reading::ZeroBase;
    }
    Reading::Value {
        value: latest / base - 1.0,
    }
}

/// Mean volume over the last 20 sessions relative to the last 60.
pub fn volume_momentum(volumes: &[u64]) -> Reading {
    let available = volumes.len();
    if available < VOLUME_LONG_WINDOW {
        return Reading::InsufficientHistory {
            required: VOLUME_LONG_WINDOW,
            available,
        };
    }

    let mean = |window: usize| {
        volumes[available - window..]
            .iter()
            .map(|v| *v as f64)
            .sum::<f64>()
            / window as f64
    };
    let long = mean(VOLUME_LONG_WINDOW);
    if long == 0.0 {
        return Reading::ZeroBase;
    }
    Reading::Value {
        value: mean(VOLUME_SHORT_WINDOW) / long,
    }
}

pub fn compute_indicators(series: &PriceSeries) -> SimulationResult<IndicatorSnapshot> {
    series.validate()?;
    let Some(last) = series.points.last() else {
        return Err(SimulationError::invalid("points", "series is empty"));
    };

    let closes = series.closes();
    let returns = ReturnWindow::ALL
        .iter()
        .map(|&window| WindowReturn {
            window,
            trading_days: window.trading_days(),
            reading: trailing_return(&closes, window.trading_days()),
        })
        .collect();

    Ok(IndicatorSnapshot {
        ticker: series.ticker.clone(),
        as_of: last.date,
        last_close: last.close,
        returns,
        volume_momentum: volume_momentum(&series.volumes()),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerIndicators {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<IndicatorSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One entry per series, in input order. A series that fails validation yields an entry
/// with `error` set instead of aborting the batch.
pub fn compute_portfolio_indicators(series: &[PriceSeries]) -> Vec<TickerIndicators> {
    series
        .iter()
        .map(|s| match compute_indicators(s) {
            Ok(snapshot) => {
                debug!(ticker = %s.ticker, as_of = %snapshot.as_of, "computed indicators");
                TickerIndicators {
                    ticker: s.ticker.clone(),
                    snapshot: Some(snapshot),
                    error: None,
                }
            }
            Err(err) => {
                warn!(ticker = %s.ticker, error = %err, "skipping ticker");
                TickerIndicators {
                    ticker: s.ticker.clone(),
                    snapshot: None,
                    error: Some(err.to_string()),
                }
            }
        })
        .collect()
}

/// `0.0525` renders as `+5.25%`.
pub fn format_return(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v * 100.0),
        None => "N/A".to_string(),
    }
}

pub fn format_volume_momentum(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.2}x"),
        None => "N/A".to_string(),
    }
}
