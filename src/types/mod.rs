pub mod row;

pub use row::{PriceRow, RawRow};
