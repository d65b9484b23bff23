pub(crate) mod display;
#[cfg(feature = "tray")]
mod tray;

pub use display::{render, tooltip, DisplaySink, LogSink};
#[cfg(feature = "tray")]
pub use display::ChannelSink;
#[cfg(feature = "tray")]
pub use tray::{TrayCallbacks, TrayManager};
