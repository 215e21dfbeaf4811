use ratatui::widgets::ListState;

use crate::poller::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Items,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Items => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Items,
        }
    }

    pub fn prev(self) -> Self {
        self.next()
    }
}

pub const PAGE_SIZE: usize = 10;

pub struct TuiApp {
    pub active_pane: ActivePane,
    /// Matches in arrival order.
    pub matches: Vec<Match>,
    pub item_index: usize,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    /// False once the poller has gone away.
    pub polling: bool,
    pub item_list_state: ListState,
}

impl TuiApp {
    pub fn new() -> Self {
        let mut item_list_state = ListState::default();
        item_list_state.select(Some(0));

        Self {
            active_pane: ActivePane::Items,
            matches: Vec::new(),
            item_index: 0,
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            polling: true,
            item_list_state,
        }
    }

    pub fn selected(&self) -> Option<&Match> {
        self.matches.get(self.item_index)
    }

    pub fn push_matches(&mut self, new: Vec<Match>) {
        if new.is_empty() {
            return;
        }
        let count = new.len();
        self.matches.extend(new);
        self.set_status(format!(
            "{} new match{} ({} total)",
            count,
            if count == 1 { "" } else { "es" },
            self.matches.len()
        ));
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Items => self.select_item(self.item_index.saturating_sub(1)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Items => self.select_item(self.item_index + 1),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(1);
            }
        }
    }

    pub fn next_page(&mut self) {
        match self.active_pane {
            ActivePane::Items => self.select_item(self.item_index + PAGE_SIZE),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE as u16);
            }
        }
    }

    pub fn prev_page(&mut self) {
        match self.active_pane {
            ActivePane::Items => self.select_item(self.item_index.saturating_sub(PAGE_SIZE)),
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE as u16);
            }
        }
    }

    pub fn first(&mut self) {
        self.select_item(0);
    }

    pub fn last(&mut self) {
        self.select_item(self.matches.len().saturating_sub(1));
    }

    fn select_item(&mut self, index: usize) {
        let index = index.min(self.matches.len().saturating_sub(1));
        if index != self.item_index {
            self.item_index = index;
            self.preview_scroll = 0;
        }
        self.item_list_state.select(Some(index));
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Item;

    fn matches(n: usize) -> Vec<Match> {
        (0..n)
            .map(|i| Match {
                item: Item::new("https://example.com/feed.xml", &i.to_string())
                    .with_title(format!("Paper {}", i)),
                trigger: "t1".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = TuiApp::new();
        app.move_down();
        assert_eq!(app.item_index, 0);

        app.push_matches(matches(3));
        app.move_down();
        app.move_down();
        app.move_down();
        assert_eq!(app.item_index, 2);
        app.move_up();
        assert_eq!(app.selected().unwrap().item.title, "Paper 1");
        app.first();
        assert_eq!(app.item_index, 0);
        app.last();
        assert_eq!(app.item_index, 2);
    }

    #[test]
    fn test_paging() {
        let mut app = TuiApp::new();
        app.push_matches(matches(25));
        app.next_page();
        assert_eq!(app.item_index, 10);
        app.next_page();
        app.next_page();
        assert_eq!(app.item_index, 24);
        app.prev_page();
        assert_eq!(app.item_index, 14);
    }

    #[test]
    fn test_push_matches_appends_and_reports() {
        let mut app = TuiApp::new();
        app.push_matches(Vec::new());
        assert!(app.status_message.is_none());

        app.push_matches(matches(1));
        assert_eq!(app.status_message.as_deref(), Some("1 new match (1 total)"));
        app.push_matches(matches(2));
        assert_eq!(app.status_message.as_deref(), Some("2 new matches (3 total)"));
        assert_eq!(app.item_index, 0);
    }

    #[test]
    fn test_preview_scroll_resets_on_selection_change() {
        let mut app = TuiApp::new();
        app.push_matches(matches(2));
        app.active_pane = app.active_pane.next();
        app.move_down();
        app.move_down();
        assert_eq!(app.preview_scroll, 2);
        app.active_pane = app.active_pane.prev();
        app.move_down();
        assert_eq!(app.preview_scroll, 0);
    }
}
