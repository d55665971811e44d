use crate::{actions::Action, effect::Effect, reducer::reduce, state::AppState};

/// Redux-style Store that holds application state and dispatches actions
///
/// - Centralized state management
/// - Actions are dispatched to modify state
/// - Pure reducers handle state transitions
/// - State is replaced on each action
pub struct Store {
    state: AppState,
}

impl Store {
    pub fn new(initial_state: AppState) -> Self {
        Self {
            state: initial_state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Get mutable reference to current state
    /// Note: Direct mutation should be avoided - prefer dispatch() for state changes
    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    /// Dispatch an action to update state
    ///
    /// Returns the effects requested by the reducers; the caller executes them.
    pub fn dispatch(&mut self, action: Action) -> Vec<Effect> {
        let (new_state, effects) = reduce(self.state.clone(), &action);
        self.state = new_state;
        effects
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_catalog::Phase;

    #[test]
    fn test_store_dispatch_quit() {
        let mut store = Store::default();
        assert!(!store.state().ui.should_quit);

        let _effects = store.dispatch(Action::Quit);
        assert!(store.state().ui.should_quit);
    }

    #[test]
    fn test_store_dispatch_toggle_shortcuts() {
        let mut store = Store::default();
        assert!(!store.state().ui.show_shortcuts);

        let _effects = store.dispatch(Action::ToggleShortcuts);
        assert!(store.state().ui.show_shortcuts);

        let _effects = store.dispatch(Action::ToggleShortcuts);
        assert!(!store.state().ui.show_shortcuts);
    }

    #[test]
    fn test_store_starts_loading() {
        let store = Store::default();
        assert_eq!(store.state().images.list.phase(), Phase::Loading);
        assert!(store.state().images.list.last_error().is_none());
    }
}
