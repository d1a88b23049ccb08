pub mod index_column_diff;
pub mod seed;
