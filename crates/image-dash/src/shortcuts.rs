use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{actions::Action, state::PendingKeyPress};

/// Two-key combinations expire after this many seconds
const TWO_KEY_TIMEOUT_SECS: u64 = 3;

/// Shortcut key definition with key matching capability
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key_display: &'static str,
    pub description: &'static str,
    pub action: Action,
    pub matcher: ShortcutMatcher,
}

/// Matcher for shortcuts - can be single key or two-key combination
#[derive(Clone)]
pub enum ShortcutMatcher {
    SingleKey(fn(&KeyEvent) -> bool),
    /// Two-key combination, e.g. ('g', 's') for "g then s"
    TwoKey(char, char),
}

impl std::fmt::Debug for ShortcutMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShortcutMatcher::SingleKey(_) => write!(f, "SingleKey"),
            ShortcutMatcher::TwoKey(k1, k2) => write!(f, "TwoKey({}, {})", k1, k2),
        }
    }
}

/// Category of shortcuts
#[derive(Debug, Clone)]
pub struct ShortcutCategory {
    pub name: &'static str,
    pub shortcuts: Vec<Shortcut>,
}

impl Shortcut {
    /// Check if this shortcut matches the given key event (single-key shortcuts only)
    pub fn matches(&self, key: &KeyEvent) -> bool {
        match &self.matcher {
            ShortcutMatcher::SingleKey(func) => func(key),
            ShortcutMatcher::TwoKey(_, _) => false,
        }
    }

    pub fn is_two_key_starting_with(&self, first_key: char) -> bool {
        matches!(&self.matcher, ShortcutMatcher::TwoKey(k1, _) if *k1 == first_key)
    }

    pub fn completes_two_key_with(&self, second_key: char) -> bool {
        matches!(&self.matcher, ShortcutMatcher::TwoKey(_, k2) if *k2 == second_key)
    }
}

fn plain_char(key: &KeyEvent, c: char) -> bool {
    key.code == KeyCode::Char(c) && !key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Get all shortcut definitions organized by category
pub fn get_shortcuts() -> Vec<ShortcutCategory> {
    vec![
        ShortcutCategory {
            name: "Navigation",
            shortcuts: vec![
                Shortcut {
                    key_display: "↑/↓ or j/k",
                    description: "Move through repositories (or tags when focused)",
                    action: Action::NavigateNext, // Represents both up/down
                    matcher: ShortcutMatcher::SingleKey(|key| {
                        matches!(
                            key.code,
                            KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('k') | KeyCode::Up
                        )
                    }),
                },
                Shortcut {
                    key_display: "←/→ or h/l",
                    description: "Previous/next page of tags",
                    action: Action::NavigateRight, // Represents both
                    matcher: ShortcutMatcher::SingleKey(|key| {
                        matches!(
                            key.code,
                            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right
                        )
                    }),
                },
                Shortcut {
                    key_display: "Enter",
                    description: "Expand repository / show pull commands for tag",
                    action: Action::Confirm,
                    matcher: ShortcutMatcher::SingleKey(|key| matches!(key.code, KeyCode::Enter)),
                },
                Shortcut {
                    key_display: "Tab",
                    description: "Switch focus between repositories and tags",
                    action: Action::ToggleFocus,
                    matcher: ShortcutMatcher::SingleKey(|key| matches!(key.code, KeyCode::Tab)),
                },
                Shortcut {
                    key_display: "Esc",
                    description: "Back to repositories / collapse row",
                    action: Action::Back,
                    matcher: ShortcutMatcher::SingleKey(|key| matches!(key.code, KeyCode::Esc)),
                },
            ],
        },
        ShortcutCategory {
            name: "Images",
            shortcuts: vec![
                Shortcut {
                    key_display: "r",
                    description: "Reload images (reconnects after a failed connect)",
                    action: Action::ReloadImages,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 'r')),
                },
                Shortcut {
                    key_display: "s",
                    description: "Sync images from registries, then reload",
                    action: Action::SyncImages,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 's')),
                },
                Shortcut {
                    key_display: "z",
                    description: "Cycle tags per page (10/20/50/100)",
                    action: Action::CyclePageSize,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 'z')),
                },
                Shortcut {
                    key_display: "p",
                    description: "Show/hide registry password",
                    action: Action::TogglePassword,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 'p')),
                },
                Shortcut {
                    key_display: "t",
                    description: "Show/hide pull token",
                    action: Action::TogglePullToken,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 't')),
                },
                Shortcut {
                    key_display: "x",
                    description: "Dismiss error",
                    action: Action::DismissError,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 'x')),
                },
            ],
        },
        ShortcutCategory {
            name: "Collection",
            shortcuts: vec![
                Shortcut {
                    key_display: "g → s",
                    description: "Seed collection with the seed data set",
                    action: Action::SeedCollection,
                    matcher: ShortcutMatcher::TwoKey('g', 's'),
                },
                Shortcut {
                    key_display: "g → p",
                    description: "Purge the collection object",
                    action: Action::PurgeCollection,
                    matcher: ShortcutMatcher::TwoKey('g', 'p'),
                },
            ],
        },
        ShortcutCategory {
            name: "Debug",
            shortcuts: vec![
                Shortcut {
                    key_display: "` or ~",
                    description: "Toggle debug console",
                    action: Action::ToggleDebugConsole,
                    matcher: ShortcutMatcher::SingleKey(|key| {
                        matches!(key.code, KeyCode::Char('`') | KeyCode::Char('~'))
                    }),
                },
                Shortcut {
                    key_display: "j/k (when console open)",
                    description: "Scroll debug console",
                    action: Action::ScrollDebugConsoleDown, // Represents both
                    matcher: ShortcutMatcher::SingleKey(|_| false), // Handled in main.rs
                },
                Shortcut {
                    key_display: "a (when console open)",
                    description: "Toggle auto-scroll",
                    action: Action::ToggleDebugAutoScroll,
                    matcher: ShortcutMatcher::SingleKey(|_| false), // Handled in main.rs
                },
                Shortcut {
                    key_display: "c (when console open)",
                    description: "Clear debug logs",
                    action: Action::ClearDebugLogs,
                    matcher: ShortcutMatcher::SingleKey(|_| false), // Handled in main.rs
                },
            ],
        },
        ShortcutCategory {
            name: "General",
            shortcuts: vec![
                Shortcut {
                    key_display: "?",
                    description: "Toggle this help",
                    action: Action::ToggleShortcuts,
                    matcher: ShortcutMatcher::SingleKey(|key| {
                        matches!(key.code, KeyCode::Char('?'))
                    }),
                },
                Shortcut {
                    key_display: "q",
                    description: "Quit application",
                    action: Action::Quit,
                    matcher: ShortcutMatcher::SingleKey(|key| plain_char(key, 'q')),
                },
            ],
        },
    ]
}

/// Get all shortcuts in a flat list for easy iteration
pub fn get_all_shortcuts_flat() -> Vec<Shortcut> {
    get_shortcuts()
        .into_iter()
        .flat_map(|category| category.shortcuts)
        .collect()
}

/// Find the action for a given key event, handling two-key combinations
/// Returns (action, should_clear_pending_key, new_pending_key)
pub fn find_action_for_key_with_pending(
    key: &KeyEvent,
    pending_key: Option<&PendingKeyPress>,
) -> (Action, bool, Option<char>) {
    let current_char = match key.code {
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    };

    let valid_pending =
        pending_key.filter(|p| p.timestamp.elapsed().as_secs() < TWO_KEY_TIMEOUT_SECS);

    if let (Some(pending), Some(current)) = (valid_pending, current_char) {
        for shortcut in get_all_shortcuts_flat() {
            if shortcut.is_two_key_starting_with(pending.key)
                && shortcut.completes_two_key_with(current)
            {
                return (shortcut.action.clone(), true, None);
            }
        }
        // Pending key didn't match, clear it and process current key normally
        return (find_single_key_action(key), true, None);
    }

    if let Some(current) = current_char
        && get_all_shortcuts_flat()
            .iter()
            .any(|s| s.is_two_key_starting_with(current))
    {
        return (Action::None, false, Some(current));
    }

    (find_single_key_action(key), true, None)
}

/// Find action for a single key press (no two-key combination logic)
fn find_single_key_action(key: &KeyEvent) -> Action {
    // Directions map to different actions than their help entry
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => return Action::NavigatePrevious,
        KeyCode::Down | KeyCode::Char('j') => return Action::NavigateNext,
        KeyCode::Left | KeyCode::Char('h') => return Action::NavigateLeft,
        KeyCode::Right | KeyCode::Char('l') => return Action::NavigateRight,
        _ => {}
    }

    get_all_shortcuts_flat()
        .into_iter()
        .find(|shortcut| shortcut.matches(key))
        .map(|shortcut| shortcut.action)
        .unwrap_or(Action::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_single_keys() {
        let (action, clear, pending) =
            find_action_for_key_with_pending(&press(KeyCode::Char('s')), None);
        assert!(matches!(action, Action::SyncImages));
        assert!(clear);
        assert!(pending.is_none());

        let (action, _, _) = find_action_for_key_with_pending(&press(KeyCode::Left), None);
        assert!(matches!(action, Action::NavigateLeft));

        let (action, _, _) = find_action_for_key_with_pending(&press(KeyCode::Enter), None);
        assert!(matches!(action, Action::Confirm));
    }

    #[test]
    fn test_two_key_seed() {
        let (action, clear, pending) =
            find_action_for_key_with_pending(&press(KeyCode::Char('g')), None);
        assert!(matches!(action, Action::None));
        assert!(!clear);
        assert_eq!(pending, Some('g'));

        let pending = PendingKeyPress {
            key: 'g',
            timestamp: Instant::now(),
        };
        let (action, clear, _) =
            find_action_for_key_with_pending(&press(KeyCode::Char('s')), Some(&pending));
        assert!(matches!(action, Action::SeedCollection));
        assert!(clear);

        let (action, _, _) =
            find_action_for_key_with_pending(&press(KeyCode::Char('p')), Some(&pending));
        assert!(matches!(action, Action::PurgeCollection));
    }

    #[test]
    fn test_expired_pending_key_falls_back_to_single_key() {
        let Some(timestamp) = Instant::now().checked_sub(Duration::from_secs(10)) else {
            return;
        };
        let pending = PendingKeyPress { key: 'g', timestamp };

        let (action, _, _) =
            find_action_for_key_with_pending(&press(KeyCode::Char('p')), Some(&pending));
        assert!(matches!(action, Action::TogglePassword));
    }

    #[test]
    fn test_ctrl_r_is_not_reload() {
        let key = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        let (action, _, _) = find_action_for_key_with_pending(&key, None);
        assert!(matches!(action, Action::None));
    }
}
