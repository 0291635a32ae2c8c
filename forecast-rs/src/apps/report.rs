//! Render-ready building blocks shared by every app report

use crate::data::{describe, Candle, CandleSeries, Column, ColumnStats};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rows shown in the head table
pub const HEAD_ROWS: usize = 5;

/// A named line; `None` leaves a gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Dense values; non-finite entries become gaps
    pub fn dense(name: impl Into<String>, values: &[f64]) -> Self {
        Self::new(
            name,
            values.iter().map(|v| v.is_finite().then_some(*v)).collect(),
        )
    }

    /// `values` placed at the end of a line `len` long, gaps before
    pub fn tail_aligned(name: impl Into<String>, len: usize, values: &[f64]) -> Self {
        let lead = len.saturating_sub(values.len());
        let mut padded = vec![None; lead];
        padded.extend(values.iter().map(|v| Some(*v)));
        Self::new(name, padded)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Horizontal axis of a chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    Dates(Vec<NaiveDate>),
    Steps(usize),
}

impl XAxis {
    pub fn len(&self) -> usize {
        match self {
            Self::Dates(d) => d.len(),
            Self::Steps(n) => *n,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tick label at position `i`
    pub fn label(&self, i: usize) -> String {
        match self {
            Self::Dates(d) => d.get(i).map(|d| d.to_string()).unwrap_or_default(),
            Self::Steps(_) => i.to_string(),
        }
    }
}

/// Line chart description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: XAxis,
    pub series: Vec<Series>,
}

impl LineChart {
    pub fn new(title: impl Into<String>, x: XAxis) -> Self {
        Self {
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            x,
            series: Vec::new(),
        }
    }

    pub fn labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }
}

/// Head rows, describe statistics and the OHLC grid of a history table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub symbol: String,
    pub rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub head: Vec<Candle>,
    pub describe: Vec<ColumnStats>,
    /// Opening, high, low and closing price charts, in that order
    pub ohlc: Vec<LineChart>,
}

impl Overview {
    pub fn of(series: &CandleSeries) -> Self {
        Self {
            symbol: series.symbol().to_string(),
            rows: series.len(),
            first_date: series.candles().first().map(|c| c.date),
            last_date: series.last().map(|c| c.date),
            head: series.head(HEAD_ROWS).to_vec(),
            describe: describe(series),
            ohlc: ohlc_grid(series),
        }
    }
}

fn ohlc_grid(series: &CandleSeries) -> Vec<LineChart> {
    [
        (Column::Open, "Opening Price"),
        (Column::High, "High Price"),
        (Column::Low, "Low Price"),
        (Column::Close, "Closing Price"),
    ]
    .into_iter()
    .map(|(column, title)| {
        LineChart::new(title, XAxis::Dates(series.dates()))
            .with(Series::dense(column.name(), &series.column(column)))
    })
    .collect()
}

/// Close price over time
pub fn close_chart(series: &CandleSeries, title: &str) -> LineChart {
    LineChart::new(title, XAxis::Dates(series.dates()))
        .labels("Date", "Price")
        .with(Series::dense("Close", &series.closes()))
}
