//! Human-friendly rendering of a [`Snapshot`].

use chrono::{DateTime, Local, TimeZone, Utc};
use std::{
    ffi::OsString,
    fmt::Display,
    io::{self, IsTerminal, Write},
};
use weather_core::{HourlyForecast, Snapshot};

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Whether stdout should receive ANSI colors.
pub fn color_enabled() -> bool {
    color_allowed(
        std::env::var_os("NO_COLOR"),
        std::env::var_os("TERM"),
        io::stdout().is_terminal(),
    )
}

/// Colors need a terminal that is not `TERM=dumb`, and `NO_COLOR` unset or empty.
fn color_allowed(no_color: Option<OsString>, term: Option<OsString>, is_terminal: bool) -> bool {
    let no_color = no_color.is_some_and(|v| !v.is_empty());
    let dumb = term.is_some_and(|t| t == "dumb");
    is_terminal && !no_color && !dumb
}

/// One upcoming hour, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct HourLine {
    pub text: String,
    /// Rain chance is at or above the threshold.
    pub rain_risk: bool,
}

#[derive(Debug, Clone)]
pub struct Presenter<Tz: TimeZone> {
    tz: Tz,
    rain_threshold: f64,
    color: bool,
}

impl Presenter<Local> {
    pub fn local(rain_threshold: f64, color: bool) -> Self {
        Self::new(Local, rain_threshold, color)
    }
}

impl<Tz> Presenter<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(tz: Tz, rain_threshold: f64, color: bool) -> Self {
        Self { tz, rain_threshold, color }
    }

    pub fn summary_line(&self, snapshot: &Snapshot) -> String {
        format!(
            "{}, {}: {:.0}C, {}",
            snapshot.location_name, snapshot.country, snapshot.temperature_c, snapshot.condition
        )
    }

    /// Hours at or after `now`, in forecast order. Earlier hours are dropped,
    /// so this is "the rest of today" rather than a rolling window.
    pub fn upcoming_hours<'a>(
        &'a self,
        snapshot: &'a Snapshot,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = HourLine> + 'a {
        snapshot
            .hours
            .iter()
            .filter(move |hour| hour.time >= now)
            .map(move |hour| self.hour_line(hour))
    }

    fn hour_line(&self, hour: &HourlyForecast) -> HourLine {
        let local = hour.time.with_timezone(&self.tz);

        HourLine {
            text: format!(
                "{} - {:.0}C, {:.0}%, {}",
                local.format("%H:%M"),
                hour.temperature_c,
                hour.rain_chance_pct,
                hour.condition
            ),
            rain_risk: hour.rain_chance_pct >= self.rain_threshold,
        }
    }

    pub fn render<W: Write>(
        &self,
        out: &mut W,
        snapshot: &Snapshot,
        now: DateTime<Utc>,
    ) -> io::Result<()> {
        writeln!(out, "{}", self.summary_line(snapshot))?;

        for line in self.upcoming_hours(snapshot, now) {
            if line.rain_risk && self.color {
                writeln!(out, "{RED}{}{RESET}", line.text)?;
            } else {
                writeln!(out, "{}", line.text)?;
            }
        }

        Ok(())
    }
}
