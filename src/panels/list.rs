use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::config::Theme;

/// Cursor, cached rows and loading flag for a table-backed panel.
#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    /// Indices into `items` that pass the filter, in order. The cursor
    /// indexes this, not `items`.
    visible: Vec<usize>,
    table_state: TableState,
    loading: bool,
    filter: Option<RowFilter<T>>,
}

/// `/` filter over one text column, matched case-insensitively.
#[derive(Debug, Clone)]
struct RowFilter<T> {
    text_of: fn(&T) -> &str,
    query: String,
    typing: bool,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            table_state: TableState::default(),
            loading: false,
            filter: None,
        }
    }
}

impl<T> ListView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list that can be narrowed with `/` by the text `text_of` returns.
    pub fn filterable(text_of: fn(&T) -> &str) -> Self {
        Self {
            filter: Some(RowFilter {
                text_of,
                query: String::new(),
                typing: false,
            }),
            ..Self::default()
        }
    }

    /// Every row, filtered out or not.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Rows that pass the filter, in display order.
    pub fn visible(&self) -> impl Iterator<Item = &T> + '_ {
        self.visible.iter().filter_map(|&idx| self.items.get(idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replace the rows, keeping the cursor where it was when possible.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.loading = false;
        self.refilter();
        let selected = match (self.visible.len(), self.table_state.selected()) {
            (0, _) => None,
            (len, Some(idx)) => Some(idx.min(len - 1)),
            (_, None) => Some(0),
        };
        self.table_state.select(selected);
    }

    /// Drop the rows and any filter.
    pub fn clear(&mut self) {
        self.items.clear();
        self.visible.clear();
        self.table_state.select(None);
        self.loading = false;
        if let Some(filter) = self.filter.as_mut() {
            filter.query.clear();
            filter.typing = false;
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.table_state.selected()
    }

    pub fn selected(&self) -> Option<&T> {
        self.table_state
            .selected()
            .and_then(|idx| self.visible.get(idx))
            .and_then(|&idx| self.items.get(idx))
    }

    pub fn select(&mut self, idx: usize) {
        if !self.visible.is_empty() {
            self.table_state.select(Some(idx.min(self.visible.len() - 1)));
        }
    }

    /// Put the cursor on the first visible row matching `pred`.
    pub fn select_where(&mut self, pred: impl Fn(&T) -> bool) -> bool {
        let found = self.visible().position(pred);
        match found {
            Some(idx) => {
                self.table_state.select(Some(idx));
                true
            }
            None => false,
        }
    }

    /// The filter text while typing or applied.
    pub fn filter_query(&self) -> Option<&str> {
        self.filter
            .as_ref()
            .filter(|f| f.typing || !f.query.is_empty())
            .map(|f| f.query.as_str())
    }

    /// Whether the filter prompt is taking keystrokes.
    pub fn is_typing_filter(&self) -> bool {
        self.filter.as_ref().is_some_and(|f| f.typing)
    }

    /// `/` opens the prompt; while it is open, text edits the query, Enter
    /// keeps it and Esc clears it. Returns whether the key was used.
    pub fn handle_filter_key(&mut self, key: &KeyEvent) -> bool {
        let Some(filter) = self.filter.as_mut() else {
            return false;
        };
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !filter.typing {
            if key.code == KeyCode::Char('/') && !ctrl {
                filter.typing = true;
                return true;
            }
            return false;
        }
        match key.code {
            KeyCode::Enter => {
                filter.typing = false;
                return true;
            }
            KeyCode::Esc => {
                filter.typing = false;
                filter.query.clear();
            }
            KeyCode::Backspace => {
                filter.query.pop();
            }
            KeyCode::Char('u') if ctrl => filter.query.clear(),
            KeyCode::Char(c) if !ctrl => filter.query.push(c),
            _ => {
                // Arrows still move through the matches.
                self.handle_nav(key);
                return true;
            }
        }
        self.refilter();
        self.table_state.select(if self.visible.is_empty() { None } else { Some(0) });
        true
    }

    fn refilter(&mut self) {
        self.visible = match &self.filter {
            Some(filter) if !filter.query.is_empty() => {
                let query = filter.query.to_lowercase();
                self.items
                    .iter()
                    .enumerate()
                    .filter(|(_, item)| (filter.text_of)(item).to_lowercase().contains(&query))
                    .map(|(idx, _)| idx)
                    .collect()
            }
            _ => (0..self.items.len()).collect(),
        };
    }

    pub fn select_next(&mut self) {
        let count = self.visible.len();
        if count == 0 {
            self.table_state.select(None);
            return;
        }
        let new_idx = match self.table_state.selected() {
            Some(idx) => (idx + 1).min(count - 1),
            None => 0,
        };
        self.table_state.select(Some(new_idx));
    }

    pub fn select_prev(&mut self) {
        if self.visible.is_empty() {
            self.table_state.select(None);
            return;
        }
        let new_idx = match self.table_state.selected() {
            Some(idx) => idx.saturating_sub(1),
            None => 0,
        };
        self.table_state.select(Some(new_idx));
    }

    /// Handle `j`/`k`/arrows/`g`/`G`/Home/End. Returns whether the key was
    /// a navigation key, whether or not the cursor actually moved.
    pub fn handle_nav(&mut self, key: &KeyEvent) -> bool {
        let typing = self.is_typing_filter();
        match key.code {
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_prev(),
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(self.visible.len().saturating_sub(1)),
            KeyCode::Char('j') if !typing => self.select_next(),
            KeyCode::Char('k') if !typing => self.select_prev(),
            KeyCode::Char('g') if !typing => self.select(0),
            KeyCode::Char('G') if !typing => self.select(self.visible.len().saturating_sub(1)),
            _ => return false,
        }
        true
    }

    /// Draw the rows as a table, or a status line while loading or empty.
    #[allow(clippy::too_many_arguments)]
    pub fn render<'a>(
        &self,
        frame: &mut Frame,
        area: Rect,
        focused: bool,
        theme: &Theme,
        title: &str,
        header: Row<'a>,
        rows: Vec<Row<'a>>,
        widths: &[Constraint],
        empty: &str,
    ) {
        let title = if self.is_loading() {
            format!(" {title} (loading…) ")
        } else if self.visible.len() != self.items.len() {
            format!(" {} ({}/{}) ", title, self.visible.len(), self.items.len())
        } else {
            format!(" {} ({}) ", title, self.items.len())
        };
        let mut block = Block::default()
            .title(Span::styled(title, theme.title_style(focused)))
            .borders(Borders::ALL)
            .border_style(theme.border_style(focused));
        if let Some(query) = self.filter_query() {
            let line = if self.is_typing_filter() {
                Line::from(vec![
                    Span::styled(" / ", theme.header_style()),
                    Span::raw(format!("{query}▏ ")),
                ])
            } else {
                Line::from(Span::styled(format!(" filter: {query} "), theme.muted()))
            };
            block = block.title_bottom(line);
        }

        if self.visible.is_empty() {
            let msg = if self.is_loading() {
                "Loading…"
            } else if !self.items.is_empty() {
                "No matches"
            } else {
                empty
            };
            frame.render_widget(Paragraph::new(msg).style(theme.muted()).block(block), area);
            return;
        }

        let table = Table::new(rows, widths.to_vec())
            .header(header.style(theme.header_style()))
            .block(block)
            .row_highlight_style(theme.selection_style(focused))
            .highlight_symbol("› ");

        frame.render_stateful_widget(table, area, &mut self.table_state.clone());
    }
}

/// A status column cell colored by its value; `-` when absent.
pub fn status_cell<'a>(theme: &Theme, status: Option<&str>) -> Cell<'a> {
    let status = status.unwrap_or("-");
    Cell::from(Span::styled(
        status.to_string(),
        Style::default().fg(theme.status_color(status)),
    ))
}
