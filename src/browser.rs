//! Folder navigation inside the chosen root: current path, the sorted
//! listing, and the snapshot the UI renders from.

mod view;

pub use view::*;

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LibrarySettings;
use crate::error::BrowseError;
use crate::library::{
    BrowseEntry, DirectoryAccess, EntryKind, FileMeta, RawEntry, SortMode, VideoEntry,
    VideoFilter, sort_listing,
};
use crate::progress::ProgressStore;

/// A folder that has been fully resolved and listed but not yet committed.
struct Resolved {
    dir: PathBuf,
    segments: Vec<String>,
    entries: Vec<BrowseEntry>,
}

pub struct Browser<A> {
    access: A,
    filter: VideoFilter,
    sort: SortMode,

    root: Option<PathBuf>,
    dir: PathBuf,
    segments: Vec<String>,
    entries: Vec<BrowseEntry>,
}

impl<A: DirectoryAccess> Browser<A> {
    pub fn new(access: A, settings: &LibrarySettings) -> Self {
        Self {
            access,
            filter: VideoFilter::new(settings),
            sort: settings.default_sort,
            root: None,
            dir: PathBuf::new(),
            segments: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Folder names from the root down to the open folder.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn entries(&self) -> &[BrowseEntry] {
        &self.entries
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort
    }

    /// Open `path` as the new root and list it. Nothing changes on failure.
    pub fn open_root(&mut self, path: &Path) -> Result<Vec<VideoEntry>, BrowseError> {
        let root = self.access.request_root(path)?;
        let entries = self.read_listing(&root)?;
        info!(root = %root.display(), entries = entries.len(), "opened root folder");

        self.root = Some(root.clone());
        self.commit(Resolved {
            dir: root,
            segments: Vec::new(),
            entries,
        });
        Ok(self.videos())
    }

    /// List the open folder again.
    pub fn refresh(&mut self) -> Result<Vec<VideoEntry>, BrowseError> {
        self.require_root()?;
        let entries = self.read_listing(&self.dir)?;
        self.entries = entries;
        Ok(self.videos())
    }

    /// Open the sub-folder `name` of the current folder.
    pub fn enter_dir(&mut self, name: &str) -> Result<Vec<VideoEntry>, BrowseError> {
        let dir = self.access.child_dir(&self.dir, name)?;
        let entries = self.read_listing(&dir)?;

        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        self.commit(Resolved {
            dir,
            segments,
            entries,
        });
        Ok(self.videos())
    }

    /// Walk from the root through `segments`. Every segment is resolved
    /// before anything is committed, so a missing folder leaves the browser
    /// where it was.
    pub fn navigate_to_path(&mut self, segments: &[String]) -> Result<Vec<VideoEntry>, BrowseError> {
        let root = self.require_root()?;
        let mut dir = root;
        for segment in segments {
            dir = self.access.child_dir(&dir, segment)?;
        }
        let entries = self.read_listing(&dir)?;

        self.commit(Resolved {
            dir,
            segments: segments.to_vec(),
            entries,
        });
        Ok(self.videos())
    }

    /// Go one folder up. `Ok(None)` when already at the root.
    pub fn parent(&mut self) -> Result<Option<Vec<VideoEntry>>, BrowseError> {
        let Some((_, up)) = self.segments.split_last() else {
            return Ok(None);
        };
        let up = up.to_vec();
        self.navigate_to_path(&up).map(Some)
    }

    pub fn home(&mut self) -> Result<Vec<VideoEntry>, BrowseError> {
        self.navigate_to_path(&[])
    }

    /// Re-order the current listing. Returns the videos in the new order.
    pub fn set_sort(&mut self, mode: SortMode) -> Vec<VideoEntry> {
        debug!(?mode, "changing sort order");
        self.sort = mode;
        sort_listing(&mut self.entries, mode);
        self.videos()
    }

    /// Video files of the listing, in listing order.
    pub fn videos(&self) -> Vec<VideoEntry> {
        self.entries
            .iter()
            .filter(|e| !e.is_dir() && self.filter.is_video(&e.name))
            .map(|e| VideoEntry::new(&self.segments, &e.name, e.handle.clone()))
            .collect()
    }

    /// Build the render snapshot of the open folder.
    pub fn view(
        &self,
        progress: &ProgressStore,
        active_key: Option<&str>,
    ) -> BrowseView {
        let crumbs = view::build_crumbs(&self.segments);
        let items = self
            .entries
            .iter()
            .map(|e| self.item_for(e, progress, active_key))
            .collect::<Vec<_>>();
        let message = items
            .is_empty()
            .then(|| EMPTY_FOLDER_MESSAGE.to_string());

        BrowseView {
            crumbs,
            items,
            sort: self.sort,
            message,
        }
    }

    fn item_for(
        &self,
        entry: &BrowseEntry,
        progress: &ProgressStore,
        active_key: Option<&str>,
    ) -> BrowseItem {
        if entry.is_dir() {
            return BrowseItem {
                kind: ItemKind::Folder,
                name: entry.name.clone(),
                progress: None,
                is_current: false,
                action: ItemAction::EnterDir(entry.name.clone()),
            };
        }
        if !self.filter.is_video(&entry.name) {
            return BrowseItem {
                kind: ItemKind::Other,
                name: entry.name.clone(),
                progress: None,
                is_current: false,
                action: ItemAction::None,
            };
        }

        let key = crate::library::identifying_path(&self.segments, &entry.name);
        BrowseItem {
            kind: ItemKind::Video,
            name: entry.name.clone(),
            progress: progress.get(&key).map(|r| r.percentage),
            is_current: active_key == Some(key.as_str()),
            action: ItemAction::PlayVideo(entry.name.clone()),
        }
    }

    fn require_root(&self) -> Result<PathBuf, BrowseError> {
        self.root
            .clone()
            .ok_or(BrowseError::NoRoot)
    }

    fn commit(&mut self, resolved: Resolved) {
        debug!(dir = %resolved.dir.display(), "entering folder");
        self.dir = resolved.dir;
        self.segments = resolved.segments;
        self.entries = resolved.entries;
    }

    fn read_listing(&self, dir: &Path) -> Result<Vec<BrowseEntry>, BrowseError> {
        let raw = self.access.list(dir)?;
        let mut entries: Vec<BrowseEntry> = raw.into_iter().map(|r| self.with_meta(r)).collect();
        sort_listing(&mut entries, self.sort);
        Ok(entries)
    }

    fn with_meta(&self, raw: RawEntry) -> BrowseEntry {
        let meta = match raw.kind {
            EntryKind::Directory => FileMeta::default(),
            EntryKind::File => self.access.metadata(&raw.handle).unwrap_or_else(|e| {
                warn!(name = %raw.name, error = %e, "metadata unavailable; listing with zero values");
                FileMeta::default()
            }),
        };
        BrowseEntry {
            name: raw.name,
            kind: raw.kind,
            handle: raw.handle,
            meta,
        }
    }
}
