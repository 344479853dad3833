//! Rendering for `--output table|json|json-compact|yaml|plain`.
//!
//! Tables go through `tabled`, structured formats through serde, and
//! `plain` prints bare values for shell pipelines.

use std::fmt::Write as _;
use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde_json::Value;
use tabled::{Table, Tabled, settings::Style};

use chromaplay_core::ApiResult;

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// `auto` colors only an interactive stdout without `NO_COLOR`.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render many items. `to_row` builds the table row, `id_fn` the
/// `plain` line; structured formats serialize `data` itself.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render one item. `detail_fn` produces the human view for `table`.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

/// Render a call result.
///
/// Structured formats emit the whole `{success, data, error, duration}`
/// envelope. `table` prints a status line with latency followed by the
/// pretty payload; `plain` prints only the payload (or error).
pub fn render_result(format: OutputFormat, result: &ApiResult<Value>, color: bool) -> String {
    match format {
        OutputFormat::Json => render_json(result, false),
        OutputFormat::JsonCompact => render_json(result, true),
        OutputFormat::Yaml => render_yaml(result),
        OutputFormat::Plain => match (&result.data, &result.error) {
            (_, Some(err)) => err.clone(),
            (Some(Value::String(s)), None) => s.clone(),
            (Some(data), None) => render_json(data, true),
            (None, None) => String::new(),
        },
        OutputFormat::Table => {
            let mut out = status_line(result, color);
            match (&result.data, &result.error) {
                (_, Some(err)) => {
                    let _ = write!(out, "\n{err}");
                }
                (Some(data), None) => {
                    let _ = write!(out, "\n{}", render_json(data, false));
                }
                (None, None) => {}
            }
            out
        }
    }
}

/// `✓ Success (12ms)` / `✗ Error (3ms)`.
pub fn status_line<T>(result: &ApiResult<T>, color: bool) -> String {
    let ms = format!("({}ms)", result.duration);
    match (result.success, color) {
        (true, true) => format!("{} {}", "✓ Success".green().bold(), ms.dimmed()),
        (false, true) => format!("{} {}", "✗ Error".red().bold(), ms.dimmed()),
        (true, false) => format!("✓ Success {ms}"),
        (false, false) => format!("✗ Error {ms}"),
    }
}

/// Write to stdout unless `--quiet` or there is nothing to show.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    if compact {
        render_json_compact(data)
    } else {
        render_json_pretty(data)
    }
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}
