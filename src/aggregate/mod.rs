//! Pure transforms from filtered rows to chart-ready data.

pub mod binning;
pub mod pie;
pub mod ranking;
pub mod scatter;

pub use binning::{
    AggregatedBin, BinRange, DeathRateTable, DistributionTable, StackLayer, StackSegment,
    death_rate_bins, distribution_bins, equal_width_edges, fixed_width_range, locate_bin,
    stack_layers,
};
pub use pie::{PieChart, PieSlice, pie_slices, pie_summary};
pub use ranking::{RankedCategory, TopK, top_k_by_frequency, top_k_by_rate, weighted_rates};
pub use scatter::{ScatterMode, ScatterPoint, ScatterSet, scatter_points};
