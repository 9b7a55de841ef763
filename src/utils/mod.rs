pub mod table;

pub use table::{ColumnKind, Table};
