//! Application model types: `App` and `Focus`.
//!
//! `App` holds the browser, the playback session, the list cursor and the
//! status line, and applies [`Intent`]s to them.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, warn};

use crate::browser::{BrowseView, Browser, ItemAction};
use crate::error::AppError;
use crate::library::{DirectoryAccess, SortMode, VideoEntry};
use crate::session::{PlaybackSurface, PlayerSession};

use super::keys::Intent;

/// Which control receives key presses.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    List,
    /// The sort-order picker popup.
    SortPicker,
}

pub struct App<S, A> {
    pub browser: Browser<A>,
    pub session: PlayerSession<S, A>,

    /// Cursor into the rows of the current listing.
    pub selected: usize,
    pub focus: Focus,
    /// Highlighted row of the sort picker, an index into [`SortMode::ALL`].
    pub sort_cursor: usize,
    /// Last error shown in the status line.
    pub status: Option<String>,

    scrub_seconds: f64,
}

impl<S: PlaybackSurface, A: DirectoryAccess> App<S, A> {
    pub fn new(browser: Browser<A>, session: PlayerSession<S, A>, scrub_seconds: u64) -> Self {
        Self {
            browser,
            session,
            selected: 0,
            focus: Focus::List,
            sort_cursor: 0,
            status: None,
            scrub_seconds: scrub_seconds as f64,
        }
    }

    /// Snapshot of the open folder for rendering.
    pub fn view(&self) -> BrowseView {
        self.browser
            .view(self.session.progress(), self.session.active_key())
    }

    /// Open `path` as the library root.
    pub fn open_root(&mut self, path: &Path) -> Result<(), AppError> {
        let videos = self.browser.open_root(path)?;
        self.enter_listing(videos);
        Ok(())
    }

    /// Apply an intent. Errors are returned for the caller to report; state
    /// is left as it was before the failing step.
    pub fn handle(&mut self, intent: Intent) -> Result<(), AppError> {
        debug!(?intent, focus = ?self.focus, "handling intent");
        if self.focus == Focus::SortPicker {
            return self.handle_picker(intent);
        }
        self.dispatch(intent)
    }

    /// Apply an intent from a remote control. These act on playback
    /// whatever has focus.
    pub fn handle_remote(&mut self, intent: Intent) -> Result<(), AppError> {
        debug!(?intent, "handling remote intent");
        self.dispatch(intent)
    }

    fn dispatch(&mut self, intent: Intent) -> Result<(), AppError> {
        match intent {
            Intent::Up => self.move_selection(-1),
            Intent::Down => self.move_selection(1),
            Intent::Activate => self.activate()?,
            Intent::Parent => {
                if let Some(videos) = self.browser.parent()? {
                    self.enter_listing(videos);
                }
            }
            Intent::Home => {
                let videos = self.browser.home()?;
                self.enter_listing(videos);
            }
            Intent::Crumb(index) => {
                let target = self
                    .view()
                    .crumbs
                    .get(index)
                    .and_then(|c| c.target.clone());
                if let Some(segments) = target {
                    self.navigate_to(&segments)?;
                }
            }
            Intent::Refresh => {
                let videos = self.browser.refresh()?;
                self.enter_listing(videos);
            }
            Intent::Play => self.session.play(),
            Intent::Pause => self.session.pause(),
            Intent::TogglePause => self.session.toggle_pause(),
            Intent::Stop => self.session.stop(),
            Intent::Next | Intent::ShortcutNext => {
                if self.session.next()? {
                    self.follow_active();
                }
            }
            Intent::Previous | Intent::ShortcutPrevious => {
                if self.session.previous()? {
                    self.follow_active();
                }
            }
            Intent::OpenSortPicker => self.open_sort_picker(),
            Intent::CloseSortPicker => {}
            Intent::ToggleAutoplay => self.session.toggle_autoplay(),
            Intent::Slower => self.session.step_rate(false),
            Intent::Faster => self.session.step_rate(true),
            Intent::ScrubBack => self.session.seek_by(-self.scrub_seconds),
            Intent::ScrubForward => self.session.seek_by(self.scrub_seconds),
            Intent::Quit => {}
        }
        Ok(())
    }

    fn handle_picker(&mut self, intent: Intent) -> Result<(), AppError> {
        let last = SortMode::ALL.len() - 1;
        match intent {
            Intent::Up => self.sort_cursor = self.sort_cursor.saturating_sub(1),
            Intent::Down => self.sort_cursor = (self.sort_cursor + 1).min(last),
            Intent::Activate => {
                self.focus = Focus::List;
                if let Some(&mode) = SortMode::ALL.get(self.sort_cursor) {
                    self.set_sort(mode);
                }
            }
            Intent::CloseSortPicker | Intent::OpenSortPicker | Intent::Quit => {
                self.focus = Focus::List;
            }
            // A focused picker swallows navigation shortcuts.
            _ => {}
        }
        Ok(())
    }

    fn open_sort_picker(&mut self) {
        let current = self.browser.sort_mode();
        self.sort_cursor = SortMode::ALL
            .iter()
            .position(|&m| m == current)
            .unwrap_or(0);
        self.focus = Focus::SortPicker;
    }

    /// Re-sort the listing, keeping the cursor on the same row.
    pub fn set_sort(&mut self, mode: SortMode) {
        let selected_name = self
            .browser
            .entries()
            .get(self.selected)
            .map(|e| e.name.clone());
        let videos = self.browser.set_sort(mode);
        self.session.rebuild_playlist(videos);
        self.selected = selected_name
            .and_then(|name| self.browser.entries().iter().position(|e| e.name == name))
            .unwrap_or(0);
    }

    fn activate(&mut self) -> Result<(), AppError> {
        let action = self
            .view()
            .items
            .get(self.selected)
            .map(|i| i.action.clone());
        match action {
            Some(ItemAction::EnterDir(name)) => {
                let videos = self.browser.enter_dir(&name)?;
                self.enter_listing(videos);
            }
            Some(ItemAction::PlayVideo(name)) => self.session.select_video(&name)?,
            Some(ItemAction::None) | None => {}
        }
        Ok(())
    }

    /// Jump to the folder a breadcrumb points at.
    pub fn navigate_to(&mut self, segments: &[String]) -> Result<(), AppError> {
        let videos = self.browser.navigate_to_path(segments)?;
        self.enter_listing(videos);
        Ok(())
    }

    fn enter_listing(&mut self, videos: Vec<VideoEntry>) {
        self.session.rebuild_playlist(videos);
        self.selected = 0;
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.browser.entries().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Put the cursor on the loaded video if it is in the open folder.
    fn follow_active(&mut self) {
        let Some(name) = self.session.active().map(|v| v.name.clone()) else {
            return;
        };
        if let Some(idx) = self.browser.entries().iter().position(|e| e.name == name) {
            self.selected = idx;
        }
    }

    /// Feed surface events and due autoplay into the session.
    pub fn pump(&mut self, now: Instant) {
        if let Err(e) = self.session.pump_surface(now) {
            self.report(Err(e.into()));
        }
        match self.session.tick(now) {
            Ok(true) => self.follow_active(),
            Ok(false) => {}
            Err(e) => self.report(Err(e.into())),
        }
    }

    /// Record the outcome of an operation in the status line.
    pub fn report(&mut self, result: Result<(), AppError>) {
        match result {
            Ok(()) => self.status = None,
            Err(e) => {
                warn!(error = %e, "operation failed");
                self.status = Some(e.to_string());
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.session.shutdown();
    }
}
