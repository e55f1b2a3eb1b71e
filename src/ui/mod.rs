pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, info, section, success};
pub use table::{rows_table, schema_table};
pub use theme::{theme, Theme};
