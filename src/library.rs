//! Folder listing: entry types, sort modes, the directory access provider and
//! the byte sources handed to the player.

mod media;
mod model;
mod scan;
mod sort;

pub use media::{ByteSource, mime_for};
pub use model::*;
pub use scan::{DirectoryAccess, FsDirectory, VideoFilter};
pub use sort::sort_listing;
