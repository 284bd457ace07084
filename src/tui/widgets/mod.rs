mod help_modal;
mod panel_view;
mod status_line;
mod tab_strip;

pub use help_modal::HelpModal;
pub use panel_view::PanelView;
pub use status_line::{StatusLine, StatusSnapshot};
pub use tab_strip::TabStrip;
