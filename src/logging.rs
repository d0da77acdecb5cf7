//! Structured logging utilities for wheelhouse
//!
//! This module provides consistent logging patterns across the codebase.
//! All logs use structured fields for easy parsing and analysis.
//!
//! # Log Format Conventions
//!
//! - `service`: The component logging ("builder", "restore", "transfer", "store")
//! - `operation`: The operation being performed (e.g., "fetch", "wheel", "upload")
//! - `status`: The result status ("success", "miss", "error")
//! - `key`: The interpreter-version key namespacing the bundle
//! - `size_bytes`: Size in bytes

use std::{fmt as std_fmt, io};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

/// Custom formatter that shows "wheelhouse" instead of full module path
struct WheelhouseFormatter {
    with_ansi: bool,
}

impl<S, N> FormatEvent<S, N> for WheelhouseFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let meta = event.metadata();

        // Write timestamp
        write!(
            writer,
            "{} ",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6fZ")
        )?;

        // Write level with wheelhouse in parentheses and color if ansi enabled
        if self.with_ansi {
            let level_style = match *meta.level() {
                tracing::Level::ERROR => "\x1b[31m", // Red
                tracing::Level::WARN => "\x1b[33m",  // Yellow
                tracing::Level::INFO => "\x1b[32m",  // Green
                tracing::Level::DEBUG => "\x1b[34m", // Blue
                tracing::Level::TRACE => "\x1b[35m", // Magenta
            };
            write!(
                writer,
                "{}{:5}(wheelhouse)\x1b[0m: ",
                level_style,
                meta.level()
            )?;
        } else {
            write!(writer, "{:5}(wheelhouse): ", meta.level())?;
        }

        // Write fields and message
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format (default for development)
    Pretty,
    /// Compact format (for CI/production)
    Compact,
    /// JSON format (for log aggregation systems)
    Json,
}

impl LogFormat {
    /// Parse from environment variable (WHEELHOUSE_LOG_FORMAT)
    pub fn from_env() -> Self {
        match std::env::var("WHEELHOUSE_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ => {
                // Default: pretty for dev, compact for CI
                if std::env::var("CI").is_ok() {
                    Self::Compact
                } else {
                    Self::Pretty
                }
            }
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "debug", "info", "warn")
/// - `WHEELHOUSE_LOG_FORMAT`: Set format ("pretty", "compact", "json")
/// - `CI`: If set, defaults to compact format
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    let format = LogFormat::from_env();

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(WheelhouseFormatter { with_ansi: true })
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .event_format(WheelhouseFormatter { with_ansi: false })
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_target(false)
                        .with_file(false)
                        .with_line_number(false)
                        .with_ansi(false)
                        .with_writer(io::stderr)
                        .json(),
                )
                .init();
        }
    }
}

/// Service names for consistent logging
#[allow(dead_code)]
pub mod services {
    pub const BUILDER: &str = "builder";
    pub const RESTORE: &str = "restore";
    pub const TRANSFER: &str = "transfer";
    pub const STORE: &str = "store";
}

/// Operation names for consistent logging
#[allow(dead_code)]
pub mod operations {
    pub const FETCH: &str = "fetch";
    pub const UNPACK: &str = "unpack";
    pub const WHEEL: &str = "wheel";
    pub const STAGE: &str = "stage";
    pub const UPLOAD: &str = "upload";
    pub const INSTALL: &str = "install";
}

/// Status values for consistent logging
#[allow(dead_code)]
pub mod status {
    pub const SUCCESS: &str = "success";
    pub const MISS: &str = "miss";
    pub const ERROR: &str = "error";
    pub const NOT_FOUND: &str = "not_found";
}
