//! Application module: the model the TUI renders and the runtime drives.
//!
//! `App` in `app::model` owns the browser and the playback session together
//! with the cursor and focus state; `app::keys` turns key presses into
//! [`Intent`]s for it.

mod keys;
mod model;

pub use keys::*;
pub use model::*;
