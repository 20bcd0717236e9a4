//! The interactive fetch / render / prompt loop.

use chrono::{DateTime, TimeZone, Utc};
use std::{
    fmt::Display,
    io::{self, BufRead, Write},
    process::ExitCode,
    sync::Arc,
};
use thiserror::Error;
use tokio::sync::Notify;
use tracing::{debug, info};
use weather_core::{FetchError, WeatherProvider};

use crate::render::Presenter;

pub const PROMPT: &str = "Enter a new location (or type 'exit' to quit):";
pub const EXIT_SENTINEL: &str = "exit";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),

    /// Input ended before a complete, newline-terminated line.
    #[error("EOF")]
    EndOfInput,

    #[error("interrupted")]
    Interrupted,

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

pub struct Session<'p, Tz: TimeZone> {
    provider: &'p dyn WeatherProvider,
    presenter: Presenter<Tz>,
    default_location: String,
    pinned_location: Option<String>,
    clock: fn() -> DateTime<Utc>,
    interrupt: Arc<Notify>,
}

impl<'p, Tz> Session<'p, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    pub fn new(
        provider: &'p dyn WeatherProvider,
        presenter: Presenter<Tz>,
        default_location: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            presenter,
            default_location: default_location.into(),
            pinned_location: None,
            clock: Utc::now,
            interrupt: Arc::new(Notify::new()),
        }
    }

    /// A location given on the command line. It replaces the current location
    /// on every pass, so prompted input only matters for the exit sentinel.
    pub fn pinned(mut self, location: Option<String>) -> Self {
        self.pinned_location = location;
        self
    }

    #[cfg(test)]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Notifying this handle ends the session with [`SessionError::Interrupted`],
    /// whether it is waiting on the network or on the prompt.
    pub fn interrupt_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.interrupt)
    }

    /// Forward Ctrl-C to [`Self::interrupt_handle`] for the rest of the process.
    pub fn interrupt_on_ctrl_c(&self) {
        let interrupt = self.interrupt_handle();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.notify_one();
            }
        });
    }

    /// Loop until the user types `exit`. Any fetch or input failure ends the
    /// session with an error; nothing is retried.
    pub async fn run<R, W>(&self, mut input: R, out: &mut W) -> Result<(), SessionError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let mut location = self.default_location.clone();

        loop {
            if let Some(pinned) = &self.pinned_location {
                location.clone_from(pinned);
            }

            info!(%location, "fetching forecast");
            let snapshot = tokio::select! {
                biased;
                _ = self.interrupt.notified() => return Err(SessionError::Interrupted),
                res = self.provider.fetch(&location) => res?,
            };

            self.presenter
                .render(out, &snapshot, (self.clock)())
                .map_err(SessionError::Output)?;

            writeln!(out, "{PROMPT}").map_err(SessionError::Output)?;
            out.flush().map_err(SessionError::Output)?;

            let (returned, line) = tokio::select! {
                biased;
                _ = self.interrupt.notified() => return Err(SessionError::Interrupted),
                res = read_line(input) => res?,
            };
            input = returned;

            location = line.trim().to_string();
            debug!(%location, "read location");

            if location == EXIT_SENTINEL {
                info!("exit requested");
                return Ok(());
            }
        }
    }

    /// Run the session and turn its outcome into a process exit code,
    /// printing `Error: ...` on failure.
    pub async fn run_to_exit<R, W>(&self, input: R, out: &mut W) -> ExitCode
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        match self.run(input, out).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                let _ = writeln!(out, "Error: {err}");
                let _ = out.flush();
                ExitCode::FAILURE
            }
        }
    }
}

/// Read one line on the blocking pool so the caller can keep awaiting other
/// events. A line without a trailing newline means the input ended.
async fn read_line<R>(mut input: R) -> Result<(R, String), SessionError>
where
    R: BufRead + Send + 'static,
{
    let (input, read) = tokio::task::spawn_blocking(move || {
        let mut line = String::new();
        let read = input.read_line(&mut line).map(|_| line);
        (input, read)
    })
    .await
    .map_err(|err| SessionError::Input(io::Error::other(err)))?;

    let line = read.map_err(SessionError::Input)?;
    if !line.ends_with('\n') {
        return Err(SessionError::EndOfInput);
    }

    Ok((input, line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::{io::Cursor, sync::Mutex};
    use weather_core::{HourlyForecast, Snapshot};

    /// Records every queried location; "Nowhere" behaves like a non-200 reply.
    #[derive(Debug, Default)]
    struct FakeProvider {
        queries: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch(&self, location: &str) -> Result<Snapshot, FetchError> {
            self.queries.lock().unwrap().push(location.to_string());

            if location == "Nowhere" {
                return Err(FetchError::ServiceUnavailable);
            }

            Ok(Snapshot {
                location_name: location.to_string(),
                country: "Testland".into(),
                temperature_c: 20.0,
                condition: "Sunny".into(),
                hours: vec![
                    HourlyForecast {
                        time: Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap(),
                        temperature_c: 15.0,
                        rain_chance_pct: 0.0,
                        condition: "Clear".into(),
                    },
                    HourlyForecast {
                        time: Utc.with_ymd_and_hms(2026, 1, 1, 13, 0, 0).unwrap(),
                        temperature_c: 19.0,
                        rain_chance_pct: 70.0,
                        condition: "Showers".into(),
                    },
                ],
            })
        }
    }

    fn frozen_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn session(provider: &FakeProvider) -> Session<'_, Utc> {
        Session::new(provider, Presenter::new(Utc, 40.0, false), "LA").with_clock(frozen_now)
    }

    #[tokio::test]
    async fn starts_with_default_location_and_follows_input() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        session(&provider).run(Cursor::new("Paris\nexit\n"), &mut out).await.unwrap();

        assert_eq!(provider.queries(), vec!["LA", "Paris"]);

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "LA, Testland: 20C, Sunny\n\
             13:00 - 19C, 70%, Showers\n\
             Enter a new location (or type 'exit' to quit):\n\
             Paris, Testland: 20C, Sunny\n\
             13:00 - 19C, 70%, Showers\n\
             Enter a new location (or type 'exit' to quit):\n"
        );
    }

    #[tokio::test]
    async fn exit_sentinel_is_trimmed() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        session(&provider).run(Cursor::new("  exit  \n"), &mut out).await.unwrap();

        assert_eq!(provider.queries(), vec!["LA"]);
    }

    #[tokio::test]
    async fn exit_sentinel_is_case_sensitive() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        session(&provider).run(Cursor::new("EXIT\nexit\n"), &mut out).await.unwrap();

        assert_eq!(provider.queries(), vec!["LA", "EXIT"]);
    }

    #[tokio::test]
    async fn pinned_location_overrides_every_prompt() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        session(&provider)
            .pinned(Some("Tokyo".into()))
            .run(Cursor::new("Paris\nBerlin\nexit\n"), &mut out)
            .await
            .unwrap();

        assert_eq!(provider.queries(), vec!["Tokyo", "Tokyo", "Tokyo"]);
    }

    #[tokio::test]
    async fn fetch_failure_ends_session_with_error_line() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let code = session(&provider).run_to_exit(Cursor::new("Nowhere\nParis\n"), &mut out).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(provider.queries(), vec!["LA", "Nowhere"]);

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with("Error: Weather API not available\n"), "got: {text}");
    }

    #[tokio::test]
    async fn end_of_input_is_an_error() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let err = session(&provider).run(Cursor::new(""), &mut out).await.unwrap_err();
        assert!(matches!(err, SessionError::EndOfInput));
    }

    #[tokio::test]
    async fn clean_exit_returns_success() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let code = session(&provider).run_to_exit(Cursor::new("exit\n"), &mut out).await;

        assert_eq!(code, ExitCode::SUCCESS);
        assert!(!String::from_utf8(out).unwrap().contains("Error:"));
    }

    #[tokio::test]
    async fn unterminated_last_line_is_end_of_input() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let code = session(&provider).run_to_exit(Cursor::new("exit"), &mut out).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert!(String::from_utf8(out).unwrap().ends_with("Error: EOF\n"));
    }

    #[tokio::test]
    async fn unterminated_location_is_not_fetched() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let err = session(&provider).run(Cursor::new("Paris"), &mut out).await.unwrap_err();

        assert!(matches!(err, SessionError::EndOfInput));
        assert_eq!(provider.queries(), vec!["LA"]);
    }

    #[tokio::test]
    async fn interrupt_before_fetch_ends_session() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let session = session(&provider);
        session.interrupt_handle().notify_one();

        let code = session.run_to_exit(Cursor::new("exit\n"), &mut out).await;

        assert_eq!(code, ExitCode::FAILURE);
        assert_eq!(String::from_utf8(out).unwrap(), "Error: interrupted\n");
    }

    /// Stdin that has not produced a line yet.
    struct Stalled;

    impl std::io::Read for Stalled {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            std::thread::sleep(std::time::Duration::from_secs(2));
            let line = b"exit\n";
            buf[..line.len()].copy_from_slice(line);
            Ok(line.len())
        }
    }

    #[tokio::test]
    async fn interrupt_at_prompt_ends_session() {
        let provider = FakeProvider::default();
        let mut out = Vec::new();

        let session = session(&provider);
        let interrupt = session.interrupt_handle();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            interrupt.notify_one();
        });

        let err = session.run(io::BufReader::new(Stalled), &mut out).await.unwrap_err();

        assert!(matches!(err, SessionError::Interrupted));
        assert_eq!(provider.queries(), vec!["LA"]);
        assert!(String::from_utf8(out).unwrap().ends_with(&format!("{PROMPT}\n")));
    }
}
