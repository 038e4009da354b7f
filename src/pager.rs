use std::io::Write;

use comfy_table::Table as TextTable;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::error::Result;
use crate::models::Table;

pub const DEFAULT_PAGE_SIZE: usize = 15;

/// Something that decides whether the next page should be shown.
pub trait ContinueSignal {
    fn wait(&mut self) -> Result<bool>;
}

/// Never blocks. Used when stdout is not a terminal.
pub struct NoWait;

impl ContinueSignal for NoWait {
    fn wait(&mut self) -> Result<bool> {
        Ok(true)
    }
}

/// Waits for a key: Enter, Space or Down continue; q, Esc or Ctrl-C stop.
pub struct KeyPress;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl ContinueSignal for KeyPress {
    fn wait(&mut self) -> Result<bool> {
        let _raw = RawModeGuard::enable()?;
        loop {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(false);
            }
            match key.code {
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Down | KeyCode::PageDown => {
                    return Ok(true)
                }
                KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
                _ => {}
            }
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct PageOutcome {
    pub pages_shown: usize,
    pub finished: bool,
}

fn render_page(table: &Table, start: usize, end: usize) -> String {
    let mut text = TextTable::new();
    text.set_header(table.headers.clone());
    for row in &table.rows[start..end] {
        text.add_row(row.clone());
    }
    text.to_string()
}

/// Print `table` `page_size` rows at a time, asking `signal` between pages.
pub fn paginate<W: Write>(
    table: &Table,
    page_size: usize,
    signal: &mut dyn ContinueSignal,
    out: &mut W,
) -> Result<PageOutcome> {
    let total = table.len();
    let page_size = page_size.max(1);
    let mut pages_shown = 0usize;

    for start in (0..total).step_by(page_size) {
        let end = (start + page_size).min(total);
        writeln!(out, "\nShowing agencies {} to {} of {}\n", start + 1, end, total)?;
        writeln!(out, "{}", render_page(table, start, end))?;
        pages_shown += 1;

        if end < total {
            writeln!(out, "\nPress Enter to see more (q to stop)...")?;
            out.flush()?;
            if !signal.wait()? {
                return Ok(PageOutcome {
                    pages_shown,
                    finished: false,
                });
            }
        }
    }

    Ok(PageOutcome {
        pages_shown,
        finished: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        answers: Vec<bool>,
        asked: usize,
    }

    impl ContinueSignal for Scripted {
        fn wait(&mut self) -> Result<bool> {
            let answer = self.answers.get(self.asked).copied().unwrap_or(true);
            self.asked += 1;
            Ok(answer)
        }
    }

    fn agencies(n: usize) -> Table {
        Table::new(
            vec!["Agency".into(), "Total_Spend".into()],
            (0..n)
                .map(|i| vec![format!("Agency {i}"), format!("${i},000,000.00")])
                .collect(),
        )
    }

    #[test]
    fn test_paginate_pages_of_fifteen() {
        let mut out = Vec::new();
        let mut signal = Scripted { answers: vec![], asked: 0 };
        let outcome = paginate(&agencies(32), DEFAULT_PAGE_SIZE, &mut signal, &mut out).unwrap();
        assert_eq!(outcome, PageOutcome { pages_shown: 3, finished: true });
        assert_eq!(signal.asked, 2);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Showing agencies 1 to 15 of 32"));
        assert!(text.contains("Showing agencies 16 to 30 of 32"));
        assert!(text.contains("Showing agencies 31 to 32 of 32"));
        assert!(text.contains("Agency 31"));
    }

    #[test]
    fn test_paginate_stops_on_signal() {
        let mut out = Vec::new();
        let mut signal = Scripted { answers: vec![false], asked: 0 };
        let outcome = paginate(&agencies(20), 15, &mut signal, &mut out).unwrap();
        assert_eq!(outcome, PageOutcome { pages_shown: 1, finished: false });
        let text = String::from_utf8(out).unwrap();
        assert!(!text.contains("Agency 15"));
    }

    #[test]
    fn test_single_page_never_waits() {
        let mut out = Vec::new();
        let mut signal = Scripted { answers: vec![false], asked: 0 };
        let outcome = paginate(&agencies(15), 15, &mut signal, &mut out).unwrap();
        assert!(outcome.finished);
        assert_eq!(signal.asked, 0);
    }

    #[test]
    fn test_empty_table_prints_nothing() {
        let mut out = Vec::new();
        let outcome = paginate(&agencies(0), 15, &mut NoWait, &mut out).unwrap();
        assert_eq!(outcome.pages_shown, 0);
        assert!(out.is_empty());
    }
}
