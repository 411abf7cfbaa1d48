//! @ai:module:intent Run the benchmark executable for the current configuration
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkExecutor, ProcessInvoker, RunJob, run_document, plan_jobs

pub mod executor;
pub mod plan;

pub use executor::{
    benchmark_args, BenchmarkExecutor, BenchmarkInvokerTrait, ProcessInvoker, RunSummary,
    RUN_CONFIG_FILE,
};
pub use plan::{plan_jobs, run_document, RunJob};
