pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{diagnostic, dim, header, info, location, muted, origin, section, success, warn};
pub use table::{call_table, stats_table, CallRow, TableBuilder};
pub use theme::{theme, Theme};
