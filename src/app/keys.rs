use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::model::Focus;

/// Everything the user (or a remote control) can ask the app to do.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Intent {
    Up,
    Down,
    Activate,
    Parent,
    Home,
    /// Jump to the breadcrumb at this position; 0 is the root.
    Crumb(usize),
    Refresh,
    Play,
    Pause,
    TogglePause,
    Stop,
    Next,
    Previous,
    /// Alt+arrow shortcuts; ignored while the sort picker has focus.
    ShortcutNext,
    ShortcutPrevious,
    OpenSortPicker,
    CloseSortPicker,
    ToggleAutoplay,
    Slower,
    Faster,
    ScrubBack,
    ScrubForward,
    Quit,
}

/// Map a key press to an intent for the given focus.
pub fn intent_for(key: KeyEvent, focus: Focus) -> Option<Intent> {
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if focus == Focus::SortPicker {
        return match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Intent::Down),
            KeyCode::Char('k') | KeyCode::Up => Some(Intent::Up),
            KeyCode::Enter => Some(Intent::Activate),
            KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => {
                Some(Intent::CloseSortPicker)
            }
            _ => None,
        };
    }

    let intent = match key.code {
        KeyCode::Right if alt => Intent::ShortcutNext,
        KeyCode::Left if alt => Intent::ShortcutPrevious,
        KeyCode::Char('j') | KeyCode::Down => Intent::Down,
        KeyCode::Char('k') | KeyCode::Up => Intent::Up,
        KeyCode::Enter => Intent::Activate,
        KeyCode::Backspace | KeyCode::Char('u') => Intent::Parent,
        KeyCode::Char('~') => Intent::Home,
        KeyCode::Char(c @ '1'..='9') => Intent::Crumb(c as usize - '1' as usize),
        KeyCode::Char('r') => Intent::Refresh,
        KeyCode::Char(' ') | KeyCode::Char('p') => Intent::TogglePause,
        KeyCode::Char('n') => Intent::Next,
        KeyCode::Char('N') => Intent::Previous,
        KeyCode::Char('s') => Intent::OpenSortPicker,
        KeyCode::Char('a') => Intent::ToggleAutoplay,
        KeyCode::Char('[') => Intent::Slower,
        KeyCode::Char(']') => Intent::Faster,
        KeyCode::Char('H') => Intent::ScrubBack,
        KeyCode::Char('L') => Intent::ScrubForward,
        KeyCode::Char('x') => Intent::Stop,
        KeyCode::Char('q') => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}
