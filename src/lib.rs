//! @ai:module:intent Workspace manager for benchmarking image denoisers and samplers
//! @ai:module:layer application
//! @ai:module:public_api config, configuration, compare, error, loader, metrics, model, report, runner, toolchain, workspace

pub mod compare;
pub mod config;
pub mod configuration;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod report;
pub mod runner;
pub mod toolchain;
pub mod workspace;

pub use compare::{CompareOptions, CompareOutcome, Comparator, ExternalComparator, ResultComparer};
pub use config::WorkspaceConfig;
pub use configuration::{ConfigStore, ConfigWarning, Configuration};
pub use error::{Error, Result};
pub use loader::{CatalogLoader, CatalogLoaderTrait};
pub use metrics::{rank_versions, Metric, MetricsAggregator, MetricsAggregatorTrait, Ranking};
pub use model::{Catalog, SceneScope, TechniqueKind};
pub use report::ReportGenerator;
pub use runner::{BenchmarkExecutor, ProcessInvoker};
pub use toolchain::{ToolchainStatus, ToolchainValidator};
pub use workspace::Workspace;
