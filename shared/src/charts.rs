//! SVG rendering of report charts

use base64::{engine::general_purpose, Engine as _};
use forecast_rs::apps::{LineChart, XAxis};
use forecast_rs::data::CorrelationMatrix;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

pub const WIDE: (u32, u32) = (960, 420);
pub const SMALL: (u32, u32) = (460, 260);
pub const SQUARE: (u32, u32) = (520, 520);

const PALETTE: [RGBColor; 6] = [BLUE, RED, GREEN, MAGENTA, CYAN, BLACK];

/// Embed an SVG document as a `data:` URI usable in an `<img>` tag
pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

/// Contiguous runs of present values, as `(index, value)` points
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, v) in values.iter().enumerate() {
        match v {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Padded value range over every series; `0..1` when nothing is drawable
fn y_range(chart: &LineChart) -> std::ops::Range<f64> {
    let (lo, hi) = chart
        .series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    if !lo.is_finite() {
        return 0.0..1.0;
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

/// Render a line chart to an SVG string
pub fn line_chart_svg(chart: &LineChart, size: (u32, u32)) -> anyhow::Result<String> {
    let len = chart
        .series
        .iter()
        .map(|s| s.len())
        .chain(std::iter::once(chart.x.len()))
        .max()
        .unwrap_or(0)
        .max(2);
    let x_axis: &XAxis = &chart.x;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0usize..len - 1, y_range(chart))?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_labels(6)
            .x_label_formatter(&|i| x_axis.label(*i))
            .draw()?;

        for (k, series) in chart.series.iter().enumerate() {
            let color = PALETTE[k % PALETTE.len()];
            for (n, run) in segments(&series.values).into_iter().enumerate() {
                let drawn = ctx.draw_series(LineSeries::new(run, &color))?;
                if n == 0 {
                    drawn
                        .label(series.name.as_str())
                        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
                }
            }
        }

        if !chart.series.is_empty() {
            ctx.configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }
        root.present()?;
    }
    Ok(svg)
}

/// Blue for negative, red for positive, grey when undefined
fn heat_color(v: f64) -> RGBColor {
    if !v.is_finite() {
        return RGBColor(200, 200, 200);
    }
    let fade = (255.0 - v.abs().min(1.0) * 200.0) as u8;
    if v >= 0.0 {
        RGBColor(255, fade, fade)
    } else {
        RGBColor(fade, fade, 255)
    }
}

/// Annotated correlation heatmap
pub fn heatmap_svg(matrix: &CorrelationMatrix, size: (u32, u32)) -> anyhow::Result<String> {
    let n = matrix.columns.len();
    if n == 0 {
        anyhow::bail!("correlation matrix is empty");
    }
    let names: Vec<&str> = matrix.columns.iter().map(|c| c.name()).collect();
    let label = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => names.get(*i).map(|s| s.to_string()).unwrap_or_default(),
        _ => String::new(),
    };

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption("Correlation Matrix", ("sans-serif", 20).into_font())
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;

        ctx.configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&label)
            .y_label_formatter(&label)
            .draw()?;

        ctx.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
            row.iter().enumerate().map(move |(j, v)| {
                Rectangle::new(
                    [
                        (SegmentValue::Exact(j), SegmentValue::Exact(i)),
                        (SegmentValue::Exact(j + 1), SegmentValue::Exact(i + 1)),
                    ],
                    heat_color(*v).filled(),
                )
            })
        }))?;

        let style = TextStyle::from(("sans-serif", 14).into_font())
            .pos(Pos::new(HPos::Center, VPos::Center));
        ctx.draw_series(matrix.values.iter().enumerate().flat_map(|(i, row)| {
            let style = style.clone();
            row.iter().enumerate().map(move |(j, v)| {
                Text::new(
                    format!("{v:.2}"),
                    (SegmentValue::CenterOf(j), SegmentValue::CenterOf(i)),
                    style.clone(),
                )
            })
        }))?;
        root.present()?;
    }
    Ok(svg)
}
