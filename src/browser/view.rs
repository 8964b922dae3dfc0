use crate::library::SortMode;

pub const HOME_CRUMB: &str = "Home";
pub const EMPTY_FOLDER_MESSAGE: &str = "No files or folders found";

/// One breadcrumb. `target` is the folder path it leads to; the crumb for
/// the open folder has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub target: Option<Vec<String>>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ItemKind {
    Folder,
    Video,
    /// A file that is listed but cannot be played.
    Other,
}

/// What activating a row does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAction {
    EnterDir(String),
    PlayVideo(String),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowseItem {
    pub kind: ItemKind,
    pub name: String,
    /// Watch progress in percent, for videos played this session.
    pub progress: Option<f64>,
    /// The video currently loaded in the player.
    pub is_current: bool,
    pub action: ItemAction,
}

/// Immutable render snapshot of the open folder.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseView {
    pub crumbs: Vec<Crumb>,
    pub items: Vec<BrowseItem>,
    pub sort: SortMode,
    /// Shown instead of the list when there is nothing to list.
    pub message: Option<String>,
}

impl BrowseView {
    /// Breadcrumb labels joined for a single status line.
    pub fn crumb_line(&self) -> String {
        self.crumbs
            .iter()
            .map(|c| c.label.as_str())
            .collect::<Vec<_>>()
            .join(" › ")
    }
}

pub(super) fn build_crumbs(segments: &[String]) -> Vec<Crumb> {
    let mut crumbs = Vec::with_capacity(segments.len() + 1);
    crumbs.push(Crumb {
        label: HOME_CRUMB.to_string(),
        target: (!segments.is_empty()).then(Vec::new),
    });
    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();
        crumbs.push(Crumb {
            label: segment.clone(),
            target: (!is_last).then(|| segments[..=i].to_vec()),
        });
    }
    crumbs
}
