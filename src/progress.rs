use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Warn => "warn",
        })
    }
}

/// Diagnostic lines on stderr, stamped with the time since the run started.
/// Stdout stays reserved for results. Nothing is written unless enabled
/// (`--verbose` or `[log] verbose = true`).
pub struct ConsoleProgress {
    enabled: bool,
    started: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            started: Instant::now(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false)
    }

    pub fn log(&self, level: Level, msg: impl AsRef<str>) {
        if !self.enabled {
            return;
        }
        let line = render_line(self.started.elapsed(), level, msg.as_ref());
        let _ = writeln!(io::stderr().lock(), "{line}");
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.log(Level::Warn, msg);
    }
}

fn render_line(elapsed: Duration, level: Level, msg: &str) -> String {
    let secs = elapsed.as_secs();
    let stamp = match (secs / 3600, secs / 60 % 60, secs % 60) {
        (0, m, s) => format!("{m:02}:{s:02}"),
        (h, m, s) => format!("{h}:{m:02}:{s:02}"),
    };
    format!("[{stamp} {level}] {msg}")
}
