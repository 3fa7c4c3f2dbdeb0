pub mod stats;
pub mod units;

pub use stats::StatsHelper;
pub use units::{km_to_nmi, mps_to_knots, UnitConverter};
