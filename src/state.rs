use std::sync::Arc;

use crate::dashboard::{evaluate, DashboardState, DashboardView, Tab};
use crate::data::filter::FilterValue;
use crate::data::model::GroupAttribute;
use crate::data::store::DatasetStore;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Base tables, read-only for the process lifetime.
    pub store: Arc<DatasetStore>,

    /// Current tab / attribute / value.
    pub dashboard: DashboardState,

    /// Output of the last evaluation of `dashboard`.
    pub view: DashboardView,

    /// Status / error message shown in the UI.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(store: Arc<DatasetStore>, dashboard: DashboardState) -> Self {
        let view = evaluate(&store, &dashboard);
        Self {
            store,
            dashboard,
            view,
            status: None,
        }
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if tab != self.dashboard.tab {
            let next = self.dashboard.with_tab(tab);
            self.transition(next);
        }
    }

    pub fn select_attribute(&mut self, attribute: GroupAttribute) {
        if attribute != self.dashboard.selection.attribute {
            let next = self.dashboard.with_attribute(attribute);
            self.transition(next);
        }
    }

    pub fn select_value(&mut self, value: FilterValue) {
        let next = self.dashboard.with_value(value);
        self.transition(next);
    }

    /// Replace the state and evaluate the dashboard from scratch.
    fn transition(&mut self, next: DashboardState) {
        if next == self.dashboard {
            return;
        }
        log::debug!(
            "{} / {} = {}",
            next.tab,
            next.selection.attribute,
            next.selection.value
        );
        self.dashboard = next;
        self.view = evaluate(&self.store, &self.dashboard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::TabView;
    use crate::data::test_support::store;

    fn state() -> AppState {
        AppState::new(Arc::new(store()), DashboardState::default())
    }

    #[test]
    fn view_follows_every_selection() {
        let mut s = state();
        assert_eq!(s.view.matching_rows, 6);

        s.select_attribute(GroupAttribute::Department);
        s.select_value("Antioquia".into());
        assert_eq!(s.view.matching_rows, 2);
        assert_eq!(s.view.value, FilterValue::from("Antioquia"));

        s.select_tab(Tab::Probability);
        assert!(matches!(s.view.content, TabView::Probability { .. }));
        assert_eq!(s.view.value, FilterValue::All);
        assert_eq!(s.view.matching_rows, 5);
    }

    #[test]
    fn reselecting_the_same_attribute_keeps_the_value() {
        let mut s = state();
        s.select_value("Andina".into());
        s.select_attribute(GroupAttribute::Region);
        assert_eq!(s.dashboard.selection.value, FilterValue::from("Andina"));
        assert_eq!(s.view.matching_rows, 3);
    }
}
