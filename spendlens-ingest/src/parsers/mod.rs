//! Interpreters turning page content into candidate transactions.

pub mod table_rows;
pub mod text_lines;

pub use table_rows::{ColumnRole, ColumnScore, infer_roles, interpret_table, score_column};
pub use text_lines::{clean_description, interpret_lines};
