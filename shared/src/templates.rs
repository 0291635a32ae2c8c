use crate::charts::{heatmap_svg, line_chart_svg, svg_data_uri, SMALL, SQUARE, WIDE};
use askama::Template;
use forecast_rs::apps::{
    AppKind, AppReport, DecisionTreeReport, LineChart, LinearCnnReport, LstmReport, Overview,
    SentimentReport, SvmReport,
};
use forecast_rs::data::ColumnStats;
use forecast_rs::models::ModelScore;

/// Compile-time build metadata
#[derive(Debug, Clone, serde::Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub build_time: &'static str,
    pub rustc: &'static str,
    pub profile: &'static str,
}

pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: env!("GIT_HASH"),
        git_branch: env!("GIT_BRANCH"),
        build_time: env!("BUILD_TIME"),
        rustc: env!("RUSTC_VERSION"),
        profile: env!("PROFILE"),
    }
}

/// Plain table of pre-formatted cells
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// One titled block of the report page
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub heading: String,
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
    /// `data:` URIs of rendered charts
    pub charts: Vec<String>,
    /// Draw charts two per row
    pub grid: bool,
}

impl Section {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            ..Default::default()
        }
    }

    fn text(mut self, paragraph: impl Into<String>) -> Self {
        self.paragraphs.push(paragraph.into());
        self
    }

    fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    fn chart(mut self, chart: &LineChart, size: (u32, u32)) -> anyhow::Result<Self> {
        self.charts.push(svg_data_uri(&line_chart_svg(chart, size)?));
        Ok(self)
    }
}

/// Report as a list of sections
#[derive(Debug, Clone)]
pub struct ReportView {
    pub title: String,
    pub sections: Vec<Section>,
}

fn fmt(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.2}")
    } else {
        "NaN".to_string()
    }
}

fn values_text(values: &[f64]) -> String {
    let shown: Vec<String> = values.iter().map(|v| fmt(*v)).collect();
    format!("[{}]", shown.join(", "))
}

fn head_table(overview: &Overview) -> Table {
    Table {
        headers: ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
            .map(String::from)
            .to_vec(),
        rows: overview
            .head
            .iter()
            .map(|c| {
                vec![
                    c.date.to_string(),
                    fmt(c.open),
                    fmt(c.high),
                    fmt(c.low),
                    fmt(c.close),
                    fmt(c.adj_close),
                    format!("{:.0}", c.volume),
                ]
            })
            .collect(),
    }
}

fn describe_table(stats: &[ColumnStats]) -> Table {
    let mut headers = vec![String::new()];
    headers.extend(stats.iter().map(|s| s.column.clone()));
    let row = |name: &str, pick: fn(&ColumnStats) -> f64| {
        let mut cells = vec![name.to_string()];
        cells.extend(stats.iter().map(|s| fmt(pick(s))));
        cells
    };
    let mut count = vec!["count".to_string()];
    count.extend(stats.iter().map(|s| s.count.to_string()));

    Table {
        headers,
        rows: vec![
            count,
            row("mean", |s| s.mean),
            row("std", |s| s.std),
            row("min", |s| s.min),
            row("25%", |s| s.q25),
            row("50%", |s| s.q50),
            row("75%", |s| s.q75),
            row("max", |s| s.max),
        ],
    }
}

fn score_table(scores: &[ModelScore]) -> Table {
    Table {
        headers: vec!["Model".to_string(), "Metric".to_string(), "Value".to_string()],
        rows: scores
            .iter()
            .map(|s| vec![s.model.clone(), s.metric.clone(), format!("{:.4}", s.value)])
            .collect(),
    }
}

fn summary_section(overview: &Overview, with_head: bool) -> Section {
    let mut section = Section::new("Data Summary").text(format!(
        "{} rows for {} ({} to {})",
        overview.rows,
        overview.symbol,
        overview.first_date.map(|d| d.to_string()).unwrap_or_default(),
        overview.last_date.map(|d| d.to_string()).unwrap_or_default(),
    ));
    if with_head {
        section = section.table(head_table(overview));
    }
    section.table(describe_table(&overview.describe))
}

fn ohlc_section(overview: &Overview) -> anyhow::Result<Section> {
    let mut section = Section {
        grid: true,
        ..Section::new("Stock Prices Over Time")
    };
    for chart in &overview.ohlc {
        section = section.chart(chart, SMALL)?;
    }
    Ok(section)
}

fn decision_tree_view(r: &DecisionTreeReport) -> anyhow::Result<Vec<Section>> {
    Ok(vec![
        summary_section(&r.overview, true),
        ohlc_section(&r.overview)?,
        Section::new("Predictions")
            .text(format!("Forecast horizon: {} days", r.future_days))
            .text(format!(
                "Decision Tree Regression Prediction: {}",
                values_text(&r.tree_predictions)
            ))
            .text(format!(
                "Linear Regression Prediction: {}",
                values_text(&r.linear_predictions)
            ))
            .table(score_table(&r.scores)),
        Section::new("Original vs Predicted").chart(&r.chart, WIDE)?,
    ])
}

fn svm_view(r: &SvmReport) -> anyhow::Result<Vec<Section>> {
    let signals: Vec<String> = r.predictions.iter().map(|p| p.to_string()).collect();
    Ok(vec![
        summary_section(&r.overview, true),
        Section::new("Stock Price Forecasting with SVM")
            .text(format!("Trained on the first {} rows", r.train_rows))
            .chart(&r.chart, WIDE)?
            .table(score_table(std::slice::from_ref(&r.score)))
            .text(format!("Predicted signals: [{}]", signals.join(" "))),
    ])
}

fn lstm_view(r: &LstmReport) -> anyhow::Result<Vec<Section>> {
    Ok(vec![
        summary_section(&r.overview, false),
        ohlc_section(&r.overview)?,
        Section::new("Closing Price vs Time chart").chart(&r.close_chart, WIDE)?,
        Section::new("Closing Price vs Time chart with 100MA").chart(&r.ma100_chart, WIDE)?,
        Section::new("Closing Price vs Time chart with 100MA & 200MA")
            .chart(&r.ma200_chart, WIDE)?,
        Section::new("Predictions vs Original")
            .text(format!("Predictor: {} over {}-day windows", r.predictor, r.lookback))
            .chart(&r.chart, WIDE)?
            .table(score_table(std::slice::from_ref(&r.score))),
    ])
}

fn linear_cnn_view(r: &LinearCnnReport) -> anyhow::Result<Vec<Section>> {
    let missing = Table {
        headers: vec!["Column".to_string(), "Missing %".to_string()],
        rows: r
            .missing
            .iter()
            .map(|m| vec![m.column.clone(), fmt(m.percent)])
            .collect(),
    };
    let features: Vec<&str> = r.features.iter().map(|c| c.name()).collect();
    let heatmap = svg_data_uri(&heatmap_svg(&r.correlation, SQUARE)?);
    let mut correlation = Section::new("Correlation Matrix")
        .text(format!("Features correlated with Close: {}", features.join(", ")));
    correlation.charts.push(heatmap);

    let mut missing = Section::new("Column wise %ge of NaN values").table(missing);
    if r.dropped_rows > 0 {
        missing = missing.text(format!("{} incomplete rows were dropped", r.dropped_rows));
    }

    let mut sections = vec![
        ohlc_section(&r.overview)?,
        summary_section(&r.overview, true),
        missing,
        correlation,
    ];
    let scores = |model: &str| -> Vec<ModelScore> {
        r.scores.iter().filter(|s| s.model == model).cloned().collect()
    };
    sections.push(
        Section::new("Linear Regression Model")
            .table(score_table(&scores("Linear Regression")))
            .chart(&r.linear_chart, WIDE)?,
    );
    sections.push(
        Section::new("CNN Model")
            .table(score_table(&scores("CNN")))
            .chart(&r.cnn_chart, WIDE)?,
    );
    Ok(sections)
}

fn sentiment_view(r: &SentimentReport) -> anyhow::Result<Vec<Section>> {
    let headlines = Table {
        headers: vec!["Headline".to_string(), "Source".to_string(), "Polarity".to_string()],
        rows: r
            .headlines
            .iter()
            .map(|h| {
                vec![
                    h.text.clone(),
                    h.headline.source.clone().unwrap_or_default(),
                    format!("{:.3}", h.polarity),
                ]
            })
            .collect(),
    };
    Ok(vec![
        Section::new("Stock Data").chart(&r.close_chart, WIDE)?,
        Section::new("Actual Stock Price").text(format!("${:.2}", r.actual_price)),
        Section::new("Predicted Stock Price").text(format!("${:.2}", r.predicted_price)),
        Section::new("Sentiment Analysis").text(format!(
            "Using Sentiment Analysis, the Predicted sentiment category for the given data is: {}",
            r.category
        )),
        Section::new(&format!("Headlines mentioning {}", r.company)).table(headlines),
    ])
}

impl ReportView {
    pub fn from_report(report: &AppReport) -> anyhow::Result<Self> {
        let sections = match report {
            AppReport::DecisionTree(r) => decision_tree_view(r)?,
            AppReport::Svm(r) => svm_view(r)?,
            AppReport::Lstm(r) => lstm_view(r)?,
            AppReport::LinearCnn(r) => linear_cnn_view(r)?,
            AppReport::Sentiment(r) => sentiment_view(r)?,
        };
        Ok(Self {
            title: report.title().to_string(),
            sections,
        })
    }
}

/// Dropdown entry
#[derive(Debug, Clone)]
pub struct AppOption {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Submitted form values, echoed back on every render
#[derive(Debug, Clone)]
pub struct FormValues {
    pub app: AppKind,
    pub ticker: String,
    pub start: String,
    pub end: String,
    pub company: String,
}

#[derive(Template)]
#[template(path = "dashboard.html.jinja", escape = "html")]
pub struct DashboardTemplate {
    pub apps: Vec<AppOption>,
    pub form: FormValues,
    pub show_company: bool,
    pub error: Option<String>,
    pub report: Option<ReportView>,
    pub build: BuildInfo,
}

impl DashboardTemplate {
    pub fn new(form: FormValues) -> Self {
        let apps = AppKind::ALL
            .iter()
            .map(|k| AppOption {
                slug: k.slug(),
                label: k.label(),
                selected: *k == form.app,
            })
            .collect();
        Self {
            apps,
            show_company: form.app == AppKind::Sentiment,
            form,
            error: None,
            report: None,
            build: build_info(),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }

    pub fn with_report(mut self, report: ReportView) -> Self {
        self.report = Some(report);
        self
    }
}
