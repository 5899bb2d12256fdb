pub mod aggregator;
pub mod arbitrator;
pub mod enabled;
pub mod normalizer;
pub mod sources;

pub use aggregator::{EnabledStateCallback, MultiSourcePriceService};
pub use arbitrator::{arbitrate, arbitrate_raw};
pub use enabled::{EnabledSources, EnabledState};
pub use normalizer::normalize_row;
pub use sources::PriceSource;
