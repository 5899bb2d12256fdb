pub mod types;
pub mod price_infra;
pub mod error;
pub mod config;
pub mod observability;
pub mod persistence;

pub use error::{Error, Result};
pub use price_infra::{
    arbitrate, normalize_row, EnabledState, MultiSourcePriceService, PriceSource,
};
pub use types::row::{PriceRow, RawRow};
