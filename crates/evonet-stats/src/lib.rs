//! Summary statistics for evolutionary runs.
//!
//! - [`descriptive`]: min, max, mean, median and spread of a fitness sample
//!
//! ```
//! use evonet_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([3.0, 1.0, 2.0]).unwrap();
//! assert_eq!(stats.mean, 2.0);
//! assert_eq!(stats.median, 2.0);
//! ```

pub mod descriptive;
