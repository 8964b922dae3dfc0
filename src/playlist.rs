//! The current folder's videos and a cursor into them.

use crate::library::VideoEntry;

/// Ordered videos of the open folder plus the selected position.
///
/// `current` is either `None` or a valid index. The list is only ever
/// replaced as a whole, never edited in place.
#[derive(Debug, Default, Clone)]
pub struct VideoPlaylist {
    entries: Vec<VideoEntry>,
    current: Option<usize>,
}

impl VideoPlaylist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the playlist and clear the selection.
    pub fn rebuild(&mut self, entries: Vec<VideoEntry>) {
        self.entries = entries;
        self.current = None;
    }

    /// Select the first video called `name`. Leaves the selection alone when
    /// no such video exists.
    pub fn select_by_name(&mut self, name: &str) -> Option<usize> {
        let idx = self.entries.iter().position(|e| e.name == name)?;
        self.current = Some(idx);
        Some(idx)
    }

    /// Advance to the following video. Never wraps; at the end (or with
    /// nothing selected) this is a no-op returning `None`.
    pub fn next(&mut self) -> Option<&VideoEntry> {
        if !self.has_next() {
            return None;
        }
        let idx = self.current? + 1;
        self.current = Some(idx);
        self.entries.get(idx)
    }

    /// Step back to the preceding video; a no-op at the start.
    pub fn previous(&mut self) -> Option<&VideoEntry> {
        if !self.has_previous() {
            return None;
        }
        let idx = self.current? - 1;
        self.current = Some(idx);
        self.entries.get(idx)
    }

    pub fn has_next(&self) -> bool {
        matches!(self.current, Some(i) if i + 1 < self.entries.len())
    }

    pub fn has_previous(&self) -> bool {
        matches!(self.current, Some(i) if i > 0)
    }

    pub fn current(&self) -> Option<&VideoEntry> {
        self.current.and_then(|i| self.entries.get(i))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Put the cursor back where it was, e.g. after a failed load.
    /// Out-of-range positions clear the selection.
    pub(crate) fn restore(&mut self, index: Option<usize>) {
        self.current = index.filter(|&i| i < self.entries.len());
    }

    pub fn entries(&self) -> &[VideoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
