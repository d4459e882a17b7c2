//! Portfolio panel view state.
//!
//! Two tabs share the panel: the positions grid with its collapsible
//! expiration groups, and the order blotter with its status filter.
//! Only display state lives here; the book and blotter own the data.

use std::collections::HashSet;

use chrono::NaiveDate;

use super::orders::StatusFilter;
use super::positions::PositionBook;

/// Positions or Orders tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortfolioTab {
    Positions,
    Orders,
}

/// View state for the portfolio panel.
#[derive(Debug, Clone)]
pub struct PortfolioView {
    active_tab: PortfolioTab,
    expanded: HashSet<NaiveDate>,
    status_filter: StatusFilter,
}

impl Default for PortfolioView {
    fn default() -> Self {
        Self {
            active_tab: PortfolioTab::Positions,
            expanded: HashSet::new(),
            status_filter: StatusFilter::All,
        }
    }
}

impl PortfolioView {
    /// Start on the positions tab with every expiration group
    /// expanded.
    pub fn new(book: &PositionBook) -> Self {
        Self {
            expanded: book.groups().iter().map(|g| g.expiration).collect(),
            ..Self::default()
        }
    }

    pub fn active_tab(&self) -> PortfolioTab {
        self.active_tab
    }

    pub fn set_tab(&mut self, tab: PortfolioTab) {
        self.active_tab = tab;
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
    }

    pub fn is_expanded(&self, expiration: NaiveDate) -> bool {
        self.expanded.contains(&expiration)
    }

    /// Collapse an expanded group or expand a collapsed one.
    pub fn toggle_group(&mut self, expiration: NaiveDate) {
        if !self.expanded.remove(&expiration) {
            self.expanded.insert(expiration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_all_groups_expanded_initially() {
        let book = PositionBook::sample();
        let view = PortfolioView::new(&book);
        assert_eq!(view.active_tab(), PortfolioTab::Positions);
        for group in book.groups() {
            assert!(view.is_expanded(group.expiration));
        }
    }

    #[test]
    fn test_toggle_group() {
        let book = PositionBook::sample();
        let mut view = PortfolioView::new(&book);
        let expiration = date("2024-08-30");

        view.toggle_group(expiration);
        assert!(!view.is_expanded(expiration));
        // Other groups unaffected
        assert!(view.is_expanded(date("2024-09-30")));

        view.toggle_group(expiration);
        assert!(view.is_expanded(expiration));
    }

    #[test]
    fn test_tab_and_filter() {
        let mut view = PortfolioView::default();
        view.set_tab(PortfolioTab::Orders);
        assert_eq!(view.active_tab(), PortfolioTab::Orders);

        view.set_status_filter(StatusFilter::Pending);
        assert_eq!(view.status_filter(), StatusFilter::Pending);
    }
}
