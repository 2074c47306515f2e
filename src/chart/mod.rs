use crate::error::{Error, Result};
use crate::models::Candle;
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use ta::indicators::{MovingAverageConvergenceDivergence, RelativeStrengthIndex};
use ta::Next;

/// Historical lookback window for chart data.
pub const LOOKBACK_DAYS: u32 = 90;

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const RSI_PERIOD: usize = 14;
const RSI_OVERBOUGHT: f64 = 70.0;
const RSI_OVERSOLD: f64 = 30.0;

const CHART_WIDTH: u32 = 1024;
const CHART_HEIGHT: u32 = 768;
// Panel ratio 3:1:1 of the total height.
const PRICE_PANEL_HEIGHT: i32 = 460;
const MACD_PANEL_HEIGHT: i32 = 154;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const GRAY: RGBColor = RGBColor(158, 158, 158);

static CHART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Render a three-panel technical chart (candlesticks, MACD, RSI) for the
/// given series and return it as PNG bytes. An empty series yields `None`
/// ("no chart available"); an indicator or drawing failure is an error.
pub fn render(candles: &[Candle], title: &str) -> Result<Option<Vec<u8>>> {
    if candles.is_empty() {
        return Ok(None);
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    let (macd_line, signal_line, histogram) = macd_series(&closes)?;
    let rsi_line = rsi_series(&closes)?;

    // BitMapBackend encodes PNG on disk; render to a scratch file and read
    // the bytes back so the caller only ever sees an in-memory buffer.
    let path = scratch_file();
    let drawn = draw_panels(
        &path, candles, &macd_line, &signal_line, &histogram, &rsi_line, title,
    );
    if let Err(e) = drawn {
        let _ = fs::remove_file(&path);
        return Err(e);
    }
    let bytes = fs::read(&path)?;
    let _ = fs::remove_file(&path);

    Ok(Some(bytes))
}

fn scratch_file() -> PathBuf {
    let seq = CHART_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("crypto_chart_{}_{}.png", std::process::id(), seq))
}

fn render_err<E: Display>(e: E) -> Error {
    Error::Render(e.to_string())
}

/// MACD(12, 26, 9) over the close column: line, signal and histogram series,
/// one value per input candle.
fn macd_series(closes: &[f64]) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>)> {
    let mut macd = MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
        .map_err(|e| Error::Render(format!("MACD setup failed: {:?}", e)))?;
    let mut line = Vec::with_capacity(closes.len());
    let mut signal = Vec::with_capacity(closes.len());
    let mut histogram = Vec::with_capacity(closes.len());
    for &close in closes {
        let out = macd.next(close);
        line.push(out.macd);
        signal.push(out.signal);
        histogram.push(out.histogram);
    }
    Ok((line, signal, histogram))
}

/// RSI(14) over the close column.
fn rsi_series(closes: &[f64]) -> Result<Vec<f64>> {
    let mut rsi = RelativeStrengthIndex::new(RSI_PERIOD)
        .map_err(|e| Error::Render(format!("RSI setup failed: {:?}", e)))?;
    Ok(closes.iter().map(|&close| rsi.next(close)).collect())
}

fn series_bounds<'a>(values: impl Iterator<Item = &'a f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
        (min.min(v), max.max(v))
    })
}

fn x_label(candles: &[Candle], x: f64) -> String {
    let i = x.round();
    if i < 0.0 || i >= candles.len() as f64 {
        return String::new();
    }
    candles[i as usize].timestamp.format("%d.%m.").to_string()
}

fn draw_panels(
    path: &Path,
    candles: &[Candle],
    macd_line: &[f64],
    signal_line: &[f64],
    histogram: &[f64],
    rsi_line: &[f64],
    title: &str,
) -> Result<()> {
    let n = candles.len();
    let x_range = -0.5f64..(n as f64 - 0.5);

    let (low, high) = series_bounds(
        candles.iter().map(|c| &c.low).chain(candles.iter().map(|c| &c.high)),
    );
    let price_pad = (high - low).max(1e-8) * 0.05;
    let price_range = (low - price_pad)..(high + price_pad);

    let (macd_min, macd_max) = series_bounds(
        histogram.iter().chain(macd_line.iter()).chain(signal_line.iter()),
    );
    let macd_range = if (macd_max - macd_min).abs() < 1e-8 {
        (macd_min - 1.0)..(macd_max + 1.0)
    } else {
        let pad = (macd_max - macd_min) * 0.1;
        (macd_min - pad)..(macd_max + pad)
    };

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;
    let (price_area, lower) = root.split_vertically(PRICE_PANEL_HEIGHT);
    let (macd_area, rsi_area) = lower.split_vertically(MACD_PANEL_HEIGHT);

    // Panel 1: candlesticks.
    let mut price_chart = ChartBuilder::on(&price_area)
        .caption(title, ("sans-serif", 28.0).into_font())
        .margin(10)
        .x_label_area_size(25)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), price_range)
        .map_err(render_err)?;
    price_chart
        .configure_mesh()
        .y_desc("Preis (€)")
        .x_label_formatter(&|x: &f64| x_label(candles, *x))
        .draw()
        .map_err(render_err)?;

    let candle_px = ((CHART_WIDTH as f64 / n as f64) * 0.6).max(1.0) as u32;
    price_chart
        .draw_series(candles.iter().enumerate().map(|(i, c)| {
            CandleStick::new(
                i as f64,
                c.open,
                c.high,
                c.low,
                c.close,
                GREEN.filled(),
                RED.filled(),
                candle_px,
            )
        }))
        .map_err(render_err)?;

    // Panel 2: MACD histogram with line and signal overlays.
    let mut macd_chart = ChartBuilder::on(&macd_area)
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), macd_range)
        .map_err(render_err)?;
    macd_chart
        .configure_mesh()
        .y_desc("MACD")
        .x_labels(0)
        .draw()
        .map_err(render_err)?;
    macd_chart
        .draw_series(histogram.iter().enumerate().map(|(i, &h)| {
            Rectangle::new([(i as f64 - 0.3, 0.0), (i as f64 + 0.3, h)], GRAY.filled())
        }))
        .map_err(render_err)?;
    macd_chart
        .draw_series(LineSeries::new(
            macd_line.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &BLUE,
        ))
        .map_err(render_err)?;
    macd_chart
        .draw_series(LineSeries::new(
            signal_line.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &ORANGE,
        ))
        .map_err(render_err)?;

    // Panel 3: RSI with overbought/oversold reference lines.
    let mut rsi_chart = ChartBuilder::on(&rsi_area)
        .margin(10)
        .x_label_area_size(0)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), 10.0f64..90.0f64)
        .map_err(render_err)?;
    rsi_chart
        .configure_mesh()
        .y_desc("RSI")
        .x_labels(0)
        .draw()
        .map_err(render_err)?;
    rsi_chart
        .draw_series(LineSeries::new(
            rsi_line.iter().enumerate().map(|(i, &v)| (i as f64, v)),
            &PURPLE,
        ))
        .map_err(render_err)?;
    rsi_chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, RSI_OVERBOUGHT), (x_range.end, RSI_OVERBOUGHT)],
            &RED,
        )))
        .map_err(render_err)?;
    rsi_chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(x_range.start, RSI_OVERSOLD), (x_range.end, RSI_OVERSOLD)],
            &GREEN,
        )))
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    Ok(())
}
