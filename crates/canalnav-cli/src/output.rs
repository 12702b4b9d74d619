//! Output formatting for command results.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use canalnav_lib::{RouteRenderMode, RouteSummary};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every junction on the route.
    #[default]
    Text,
    /// One line per waterway joined.
    Plan,
    /// Machine readable JSON.
    Json,
}

impl From<OutputFormat> for RouteRenderMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => RouteRenderMode::PlainText,
            OutputFormat::Plan => RouteRenderMode::Plan,
            OutputFormat::Json => RouteRenderMode::Json,
        }
    }
}

impl OutputFormat {
    /// Render a route summary and write it to stdout.
    pub fn render_route(self, summary: &RouteSummary) -> Result<()> {
        let rendered = summary.render(self.into())?;
        write_stdout(&rendered)
    }

    /// Render any serialisable value: JSON for `json`, `text` otherwise.
    pub fn render_value<T: Serialize>(self, value: &T, text: impl FnOnce() -> String) -> Result<()> {
        match self {
            OutputFormat::Json => {
                let mut rendered = serde_json::to_string_pretty(value)?;
                rendered.push('\n');
                write_stdout(&rendered)
            }
            OutputFormat::Text | OutputFormat::Plan => write_stdout(&text()),
        }
    }
}

fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_map_to_render_modes() {
        assert_eq!(RouteRenderMode::from(OutputFormat::Text), RouteRenderMode::PlainText);
        assert_eq!(RouteRenderMode::from(OutputFormat::Plan), RouteRenderMode::Plan);
        assert_eq!(RouteRenderMode::from(OutputFormat::Json), RouteRenderMode::Json);
    }

    #[test]
    fn format_names_parse_case_insensitively() {
        assert_eq!(OutputFormat::from_str("PLAN", true).unwrap(), OutputFormat::Plan);
        assert!(OutputFormat::from_str("rich", true).is_err());
    }
}
