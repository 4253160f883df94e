// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Log subscriber setup.
//!
//! Logs go to stderr so `snipd config show --json` output stays clean.

use std::io::{self, IsTerminal};

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// How the server's log output is shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Level for snipd and the HTTP layer when `RUST_LOG` is unset.
    pub level: Level,

    /// Full format with span open/close events and file:line.
    pub verbose_spans: bool,

    /// ANSI colors; off unless stderr is a terminal.
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            verbose_spans: false,
            ansi: io::stderr().is_terminal(),
        }
    }
}

impl TelemetryConfig {
    /// Pick the shape from the CLI verbosity flags. `--debug` wins over `--verbose`.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        let level = if debug {
            Level::TRACE
        } else if verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        Self {
            level,
            verbose_spans: verbose || debug,
            ..Self::default()
        }
    }

    /// Filter used without `RUST_LOG`: dependencies stay at warn.
    fn default_directive(&self) -> String {
        let level = self.level.to_string().to_ascii_lowercase();
        format!("warn,snipd={level},tower_http={level}")
    }
}

/// Guard returned by [`init_telemetry`].
///
/// Dropping it logs the final metrics report at debug level.
pub struct TelemetryGuard {
    _private: (),
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        #[cfg(feature = "telemetry")]
        tracing::debug!(
            "{}",
            super::metrics::GLOBAL_METRICS.snapshot().format_report()
        );
    }
}

/// Install the global subscriber. Call once, before the server starts.
pub fn init_telemetry(config: &TelemetryConfig) -> io::Result<TelemetryGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let span_events = if config.verbose_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(config.ansi)
        .with_file(config.verbose_spans)
        .with_line_number(config.verbose_spans)
        .with_span_events(span_events);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.verbose_spans {
        registry.with(fmt_layer).try_init()
    } else {
        registry.with(fmt_layer.compact()).try_init()
    };
    installed.map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    Ok(TelemetryGuard { _private: () })
}
