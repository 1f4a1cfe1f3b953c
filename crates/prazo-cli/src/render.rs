use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use prazo_core::clock::format_local;
use prazo_core::{Registry, Stage, ThemeMode};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Heading,
    Id,
    Overdue,
    Banner,
    Muted,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
    theme: ThemeMode,
}

impl Renderer {
    pub fn new(cfg: &Config, theme: ThemeMode) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self::with_color(color && io::stdout().is_terminal(), theme))
    }

    pub fn with_color(color: bool, theme: ThemeMode) -> Self {
        Self { color, theme }
    }

    pub fn set_theme(&mut self, theme: ThemeMode) {
        self.theme = theme;
    }

    #[tracing::instrument(skip(self, registry, now))]
    pub fn print_board(&self, registry: &Registry, now: DateTime<Utc>) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_board(out, registry, now)
    }

    pub fn write_board<W: Write>(
        &self,
        mut out: W,
        registry: &Registry,
        now: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        for (idx, stage) in Stage::ALL.into_iter().enumerate() {
            if idx > 0 {
                writeln!(out)?;
            }
            let records = registry.stage(stage);
            let heading = format!("{} ({})", stage.label(), records.len());
            writeln!(out, "{}", self.paint(&heading, Tone::Heading))?;

            if records.is_empty() {
                writeln!(out, "{}", self.paint("  (empty)", Tone::Muted))?;
                continue;
            }

            let headers = vec![
                "ID".to_string(),
                "Task".to_string(),
                "Created".to_string(),
                "Deadline".to_string(),
            ];
            let rows = records
                .iter()
                .map(|record| {
                    let deadline = format_local(record.deadline);
                    let deadline = if record.is_overdue(now) {
                        self.paint(&format!("{deadline} !"), Tone::Overdue)
                    } else {
                        deadline
                    };
                    vec![
                        self.paint(&record.id.short(), Tone::Id),
                        record.text.clone(),
                        format_local(record.created_at),
                        deadline,
                    ]
                })
                .collect();

            write_table(&mut out, headers, rows)?;
        }
        Ok(())
    }

    pub fn banner(&self, message: &str) -> String {
        self.paint(message, Tone::Banner)
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match (self.theme, tone) {
            (ThemeMode::Light, Tone::Heading) => "1;34",
            (ThemeMode::Dark, Tone::Heading) => "1;96",
            (ThemeMode::Light, Tone::Id) => "33",
            (ThemeMode::Dark, Tone::Id) => "93",
            (ThemeMode::Light, Tone::Overdue) => "31",
            (ThemeMode::Dark, Tone::Overdue) => "91",
            (ThemeMode::Light, Tone::Banner) => "1;37;41",
            (ThemeMode::Dark, Tone::Banner) => "1;30;101",
            (ThemeMode::Light, Tone::Muted) => "2",
            (ThemeMode::Dark, Tone::Muted) => "90",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "  {:width$}", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "  {:-<width$}", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "  {}{}", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
