mod directory_list;
mod media_grid;
mod preview;
mod status_bar;

pub use directory_list::{directory_at, render_directory_list};
pub use media_grid::{point_to_units, render_media_grid};
pub use preview::render_preview;
pub use status_bar::render_status_bar;
