use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::Local;
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color_cfg = cfg.get("color").unwrap_or_else(|| "on".to_string());
        let color = match color_cfg.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" => true,
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };

        Ok(Self {
            color: color && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn print_task_table(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_table(out, tasks)
    }

    pub fn write_task_table<W: Write>(&self, mut out: W, tasks: &[Task]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "No tasks yet.")?;
            return Ok(());
        }

        let headers = ["#", "ID", "Done", "Title", "Description", "Created"]
            .map(str::to_string)
            .to_vec();

        let rows = tasks
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let done = if task.completed {
                    self.paint("[x]", "32")
                } else {
                    "[ ]".to_string()
                };
                let title = if task.completed {
                    self.paint(&task.title, "9")
                } else {
                    task.title.clone()
                };
                vec![
                    (idx + 1).to_string(),
                    self.paint(&task.id, "33"),
                    done,
                    title,
                    task.description.clone(),
                    task.created_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip(self, task), fields(id = %task.id))]
    pub fn print_task_info(&self, task: &Task) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        self.write_task_info(out, task)
    }

    pub fn write_task_info<W: Write>(&self, mut out: W, task: &Task) -> anyhow::Result<()> {
        writeln!(out, "id          {}", task.id)?;
        writeln!(out, "title       {}", task.title)?;
        if task.has_description() {
            writeln!(out, "description {}", task.description)?;
        }
        writeln!(
            out,
            "status      {}",
            if task.completed { "completed" } else { "open" }
        )?;
        writeln!(out, "created     {}", task.created_at.to_rfc3339())?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
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
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for width in &widths {
        write!(writer, "{:-<width$} ", "", width = *width)?;
    }
    writeln!(writer)?;

    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
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

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn task(id: &str, title: &str, description: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            completed,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn table_keeps_server_order_and_marks_completion() {
        let tasks = vec![
            task("b2", "Second", "", true),
            task("a1", "First", "café", false),
        ];
        let mut buf = Vec::new();
        Renderer::plain()
            .write_task_table(&mut buf, &tasks)
            .expect("render table");
        let text = String::from_utf8(buf).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("# "));
        assert!(lines[2].contains("b2") && lines[2].contains("[x]"));
        assert!(lines[3].contains("a1") && lines[3].contains("[ ]"));
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn empty_list_has_placeholder() {
        let mut buf = Vec::new();
        Renderer::plain()
            .write_task_table(&mut buf, &[])
            .expect("render table");
        assert_eq!(String::from_utf8(buf).expect("utf8"), "No tasks yet.\n");
    }

    #[test]
    fn strip_ansi_removes_escape_sequences() {
        assert_eq!(strip_ansi("\x1b[33mabc\x1b[0m"), "abc");
    }
}
