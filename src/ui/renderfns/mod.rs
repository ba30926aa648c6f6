pub mod header;
pub mod utils;

pub use header::draw_header;
pub use utils::{format_date, license_color, origin_marker, truncate};
