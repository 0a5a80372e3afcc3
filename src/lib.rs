//! Frequency-distribution and anomaly statistics for a cleaned content catalog.
//!
//! The pipeline per field: expand delimited multi-valued columns into tokens, tabulate
//! token (or scalar) frequencies, summarize the shape of the count distribution, and
//! flag outlying categories by IQR fencing and z-score thresholding. The report
//! assembler composes these per configured field along with missing-value figures.

pub mod config;
pub mod expand;
pub mod frequency;
pub mod outliers;
pub mod render;
pub mod report;
pub mod source;
pub mod statistics;

pub use config::{AppConfig, ConfigManager, FieldKind, FieldSpec};
pub use frequency::FrequencyTable;
pub use outliers::{detect, Direction, IqrFences, Outlier, OutlierReport};
pub use report::{AnalysisContext, CatalogReport, FieldReport, MissingStats};
pub use statistics::{summarize, AnalysisFlag, DistributionSummary, NormalityTest, Statistic};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "titlestat";
