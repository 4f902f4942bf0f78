// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use notify::{Event as NotifyEvent, EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Format a timestamp as relative time (e.g. "5s", "2m", "1h", "3d").
pub fn format_time_ago(epoch_ms: u64) -> String {
    if epoch_ms == 0 {
        return "-".to_string();
    }
    let now_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;
    format_elapsed(now_ms.saturating_sub(epoch_ms) / 1000)
}

pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Info about items that were truncated by [`apply_limit`].
pub struct Truncation {
    pub remaining: usize,
}

/// Apply limit/no_limit to a vec, return truncation info if items were removed.
pub fn apply_limit<T>(items: &mut Vec<T>, limit: usize, no_limit: bool) -> Option<Truncation> {
    let total = items.len();
    let effective = if no_limit { total } else { limit };
    if total > effective {
        items.truncate(effective);
        Some(Truncation { remaining: total - effective })
    } else {
        None
    }
}

/// Render a list as text table or JSON. Handles empty check + format branch.
pub fn handle_list<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    handle_list_with_limit(format, items, empty_msg, None, render_text)
}

/// Like [`handle_list`] but prints a truncation message when items were limited.
pub fn handle_list_with_limit<T: Serialize>(
    format: OutputFormat,
    items: &[T],
    empty_msg: &str,
    truncation: Option<Truncation>,
    render_text: impl FnOnce(&[T], &mut dyn Write),
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items)?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{empty_msg}");
            } else {
                render_text(items, &mut std::io::stdout());
            }
            if let Some(trunc) = truncation {
                if trunc.remaining > 0 {
                    println!("\n... {} more not shown. Use --no-limit or -n N to see more.", trunc.remaining);
                }
            }
        }
    }
    Ok(())
}

/// Format-branch helper for non-list commands (show, status, etc.).
pub fn format_or_json<T: Serialize>(format: OutputFormat, data: &T, text_fn: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
        OutputFormat::Text => text_fn(),
    }
    Ok(())
}

/// Print the last lines of a log file, then optionally follow it until Ctrl-C.
pub async fn display_log(log_path: &std::path::Path, content: &str, follow: bool, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            if content.is_empty() {
                eprintln!("No log entries found at {}", log_path.display());
            } else {
                print!("{content}");
                if !content.ends_with('\n') {
                    println!();
                }
            }
            if follow && log_path.exists() {
                tail_file(log_path).await?;
            }
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "log_path": log_path.to_string_lossy(),
                "lines": content.lines().collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
            if follow {
                eprintln!("warning: --follow is not supported with --output json");
            }
        }
    }
    Ok(())
}

/// Tail a file, printing new lines as they appear, until Ctrl-C.
pub async fn tail_file(path: &std::path::Path) -> anyhow::Result<()> {
    let mut file =
        std::fs::File::open(path).map_err(|_| anyhow::anyhow!("log file not found: {}", path.display()))?;
    file.seek(SeekFrom::End(0))?;
    let mut reader = BufReader::new(file);

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let path_buf = path.to_path_buf();
    let mut watcher = notify::recommended_watcher(move |res: Result<NotifyEvent, _>| {
        if let Ok(event) = res {
            if matches!(event.kind, EventKind::Modify(_)) {
                let _ = tx.blocking_send(());
            }
        }
    })?;
    let watch_dir = path_buf.parent().unwrap_or(&path_buf);
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        let mut line = String::new();
        while reader.read_line(&mut line)? > 0 {
            print!("{line}");
            line.clear();
        }
        tokio::select! {
            _ = rx.recv() => {}
            _ = &mut ctrl_c => break,
        }
    }
    Ok(())
}
