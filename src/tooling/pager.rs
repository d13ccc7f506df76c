//! Console pager for the inventory listing.
//!
//! Groups rows into terminal-height pages. Full pages are piped through
//! the external pager (`$PAGER`, default `less`); the final partial page
//! is printed directly so short listings never open a pager at all.

use crate::error::ApiError;
use crate::format::render_inventory_page;
use crate::inventory::FunctionRow;
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::warn;

/// Terminal size fallback when no tty is attached.
const FALLBACK_ROWS: u16 = 50;

/// Rows available on the attached terminal.
pub fn terminal_rows() -> u16 {
    crossterm::terminal::size()
        .map(|(_cols, rows)| rows)
        .unwrap_or(FALLBACK_ROWS)
        .max(1)
}

/// Buffers inventory rows into console pages.
pub struct InventoryPager {
    page_size: usize,
    quiet: bool,
    first_page: bool,
    rows: Vec<FunctionRow>,
}

impl InventoryPager {
    pub fn new(page_size: usize, quiet: bool) -> Self {
        Self {
            page_size: page_size.max(1),
            quiet,
            first_page: true,
            rows: Vec::new(),
        }
    }

    fn header_for_current_page(&self) -> bool {
        !self.quiet && self.first_page
    }

    /// Buffer one row, flushing a full page through the pager.
    pub fn push(&mut self, row: FunctionRow) -> Result<(), ApiError> {
        self.rows.push(row);
        if self.rows.len() >= self.page_size {
            let page = render_inventory_page(&self.rows, self.header_for_current_page());
            self.first_page = false;
            self.rows.clear();
            page_through_external_pager(&page)?;
        }
        Ok(())
    }

    /// Print whatever remains of the last page directly.
    pub fn finish(mut self) -> Result<(), ApiError> {
        if self.rows.is_empty() && !self.first_page {
            return Ok(());
        }
        let page = render_inventory_page(&self.rows, self.header_for_current_page());
        self.rows.clear();
        print!("{}", page);
        std::io::stdout().flush()?;
        Ok(())
    }
}

/// Pipe one page through `$PAGER`, falling back to direct output when no
/// pager can be spawned.
fn page_through_external_pager(page: &str) -> Result<(), ApiError> {
    let pager = std::env::var("PAGER").unwrap_or_else(|_| "less".to_string());
    let child = Command::new(&pager).stdin(Stdio::piped()).spawn();
    match child {
        Ok(mut child) => {
            if let Some(stdin) = child.stdin.take() {
                let mut stdin = stdin;
                stdin.write_all(page.as_bytes())?;
            }
            child.wait()?;
            Ok(())
        }
        Err(e) => {
            warn!(pager = %pager, error = %e, "pager unavailable, printing directly");
            print!("{}", page);
            std::io::stdout().flush()?;
            Ok(())
        }
    }
}
