//! Plain-text rendering of a [`Dashboard`].

use std::fmt::{self, Write};

use crate::dashboard::Dashboard;

const GAUGE_CELLS: usize = 20;
const TREND_CELLS: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Colour the AQI gauge with 24-bit ANSI escapes.
    pub color: bool,
}

/// A dashboard paired with its render options, printable with `{}`.
#[derive(Debug, Clone, Copy)]
pub struct DashboardView<'a> {
    pub dashboard: &'a Dashboard,
    pub options: RenderOptions,
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_dashboard(f, self.dashboard, &self.options)
    }
}

pub fn render(dash: &Dashboard, opts: &RenderOptions) -> String {
    DashboardView {
        dashboard: dash,
        options: *opts,
    }
    .to_string()
}

fn write_dashboard<W: Write>(out: &mut W, dash: &Dashboard, opts: &RenderOptions) -> fmt::Result {
    let h = &dash.headline;
    let updated = dash.updated_at.format("%H:%M");

    writeln!(out, "{}", h.location)?;
    writeln!(out, "{} ({})", h.condition, h.icon)?;
    writeln!(
        out,
        "Temperature: {}  Feels like: {}",
        or_na(h.temperature_c.map(|t| format!("{t}°C"))),
        or_na(h.feels_like_c.map(|t| format!("{t}°C"))),
    )?;
    writeln!(
        out,
        "Humidity: {}  Wind: {}  Visibility: {}",
        or_na(h.humidity_pct.map(|v| format!("{v}%"))),
        or_na(h.wind_speed_kmh.map(|v| format!("{v} km/h"))),
        or_na(h.visibility_km.map(|v| format!("{v:.1} km"))),
    )?;
    writeln!(out, "Last updated: {updated}")?;

    let aq = &dash.air_quality;
    writeln!(out)?;
    writeln!(out, "Air quality")?;
    writeln!(
        out,
        "  AQI {:>3}  [{}] {}",
        aq.reading.index,
        gauge(aq.gauge_width_pct, &aq.gauge_color, opts),
        aq.reading.category,
    )?;
    writeln!(out, "  {}", aq.reading.description)?;
    writeln!(out, "  Wind: {} {} km/h", aq.wind.direction, aq.wind.speed_kmh)?;

    if !dash.trend.is_empty() {
        writeln!(out)?;
        writeln!(out, "Temperature trend")?;
        for bar in &dash.trend {
            let cells = cells_for(bar.height_pct, TREND_CELLS);
            writeln!(
                out,
                "  {:>5}  {:<width$} {}°C",
                bar.time.format("%-I %p").to_string(),
                "#".repeat(cells),
                bar.temperature_c.round(),
                width = TREND_CELLS,
            )?;
        }
    }

    if !dash.hourly.is_empty() {
        writeln!(out)?;
        writeln!(out, "Next hours")?;
        for slot in &dash.hourly {
            writeln!(
                out,
                "  {:>5}  {:<20} {:>4}°",
                slot.label, slot.icon, slot.temperature_c
            )?;
        }
    }

    let s = &dash.savings;
    writeln!(out)?;
    writeln!(out, "Carbon savings")?;
    writeln!(out, "  Bike:  {:.1} kg CO₂", s.bike_kg)?;
    writeln!(out, "  Walk:  {:.1} kg CO₂", s.walk_kg)?;
    writeln!(out, "  Total: {:.1} kg CO₂", s.total_kg)?;

    Ok(())
}

fn or_na(value: Option<String>) -> String {
    value.unwrap_or_else(|| "N/A".to_string())
}

fn cells_for(pct: f64, total: usize) -> usize {
    let filled = (pct.clamp(0.0, 100.0) / 100.0 * total as f64).round();
    (filled as usize).min(total)
}

fn gauge(width_pct: u8, color_hex: &str, opts: &RenderOptions) -> String {
    let filled = cells_for(f64::from(width_pct), GAUGE_CELLS);
    let bar = "#".repeat(filled);
    let rest = "-".repeat(GAUGE_CELLS - filled);

    match parse_hex(color_hex).filter(|_| opts.color) {
        Some((r, g, b)) => format!("\x1b[38;2;{r};{g};{b}m{bar}\x1b[0m{rest}"),
        None => format!("{bar}{rest}"),
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }

    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
