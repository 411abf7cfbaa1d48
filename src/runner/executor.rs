//! @ai:module:intent Drive the external benchmark executable over the jobs of a configuration
//! @ai:module:layer application
//! @ai:module:public_api BenchmarkExecutor, BenchmarkInvokerTrait, ProcessInvoker, RunSummary, RUN_CONFIG_FILE
//! @ai:module:stateless false

use crate::configuration::Configuration;
use crate::error::{write_json, Error, Result};
use crate::model::Catalog;
use crate::runner::plan::{plan_jobs, run_document, RunJob};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Run document written into the slot for the benchmark executable.
pub const RUN_CONFIG_FILE: &str = ".run-config.json";

/// @ai:intent Arguments of one benchmark invocation
/// @ai:effects pure
pub fn benchmark_args(job: &RunJob, run_config: &Path, overwrite: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "--config".into(),
        run_config.into(),
        "--filter".into(),
        job.executable.clone().into(),
        "--output".into(),
        job.output.clone().into(),
    ];
    if !overwrite {
        args.push("--resume".into());
    }
    args
}

/// @ai:intent Trait for invoking the benchmark executable
pub trait BenchmarkInvokerTrait {
    /// @ai:intent Run one benchmark invocation to completion
    fn invoke(&self, args: &[OsString]) -> Result<()>;
}

/// @ai:intent Runs the installed benchmark executable, streaming its output to the terminal
pub struct ProcessInvoker {
    benchmark: PathBuf,
}

impl ProcessInvoker {
    /// @ai:effects pure
    pub fn new(benchmark: PathBuf) -> Self {
        Self { benchmark }
    }
}

impl BenchmarkInvokerTrait for ProcessInvoker {
    /// @ai:effects io
    fn invoke(&self, args: &[OsString]) -> Result<()> {
        let status = Command::new(&self.benchmark).args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(Error::ToolFailed {
                tool: self.benchmark.display().to_string(),
                status: status.to_string(),
            })
        }
    }
}

/// @ai:intent Outcome of a benchmark run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub succeeded: Vec<String>,
    pub failed: Vec<String>,
}

/// @ai:intent Executes the jobs of a configuration, one version at a time
pub struct BenchmarkExecutor<I: BenchmarkInvokerTrait> {
    invoker: I,
    overwrite: bool,
}

impl<I: BenchmarkInvokerTrait> BenchmarkExecutor<I> {
    /// @ai:intent Create a new benchmark executor
    /// @ai:effects pure
    pub fn new(invoker: I, overwrite: bool) -> Self {
        Self { invoker, overwrite }
    }

    /// @ai:intent Write the run document into the slot and run every job; a failed job does not stop the others
    /// @ai:effects fs:write, io
    pub fn execute(
        &self,
        config: &Configuration,
        catalog: &Catalog,
        scenes_dir: &Path,
        slot_dir: &Path,
    ) -> Result<RunSummary> {
        let document = run_document(config, catalog, scenes_dir);
        let jobs = plan_jobs(config, catalog, slot_dir);
        let mut summary = RunSummary::default();
        if document.renderers.is_empty() || jobs.is_empty() {
            tracing::warn!("Nothing to run for configuration '{}'", config.name);
            return Ok(summary);
        }

        std::fs::create_dir_all(slot_dir).map_err(|e| Error::write(slot_dir, e))?;
        let run_config = slot_dir.join(RUN_CONFIG_FILE);
        write_json(&run_config, &document)?;

        tracing::info!("Running configuration '{}' ({} jobs)", config.name, jobs.len());
        for job in &jobs {
            tracing::info!("Benchmarking: {}", job.name);
            std::fs::create_dir_all(&job.output).map_err(|e| Error::write(&job.output, e))?;
            match self
                .invoker
                .invoke(&benchmark_args(job, &run_config, self.overwrite))
            {
                Ok(()) => summary.succeeded.push(job.name.clone()),
                Err(e) => {
                    tracing::error!("Benchmark of {} failed: {}", job.name, e);
                    summary.failed.push(job.name.clone());
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ConfigDocument;
    use crate::error::read_json;
    use crate::model::{NewScene, NewTechnique, NewVersion, TechniqueKind, VersionStatus};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct RecordingInvoker {
        calls: RefCell<Vec<Vec<OsString>>>,
        fail_on: Option<&'static str>,
    }

    impl BenchmarkInvokerTrait for RecordingInvoker {
        fn invoke(&self, args: &[OsString]) -> Result<()> {
            self.calls.borrow_mut().push(args.to_vec());
            let failing = self
                .fail_on
                .is_some_and(|name| args.iter().any(|a| a.to_string_lossy().ends_with(name)));
            if failing {
                return Err(Error::ToolFailed {
                    tool: "benchmark".to_string(),
                    status: "exit status: 1".to_string(),
                });
            }
            Ok(())
        }
    }

    fn catalog(temp: &Path) -> Catalog {
        let mut catalog = Catalog::new();
        let renderer = catalog.add_renderer("pbrt", temp.join("pbrt"), true);
        catalog.add_scene(
            renderer,
            NewScene {
                name: "box".to_string(),
                path: PathBuf::from("box.pbrt"),
                ..Default::default()
            },
        );
        for name in ["LBF", "NFOR"] {
            let technique = catalog
                .filters
                .add_technique(NewTechnique { name: name.to_string(), ..Default::default() })
                .unwrap();
            catalog
                .filters
                .add_version(
                    technique,
                    NewVersion {
                        tag: "default".to_string(),
                        message: String::new(),
                        executable: temp.join(name),
                        status: VersionStatus::Ready,
                    },
                )
                .unwrap();
        }
        catalog
    }

    #[test]
    fn test_benchmark_args_resume_unless_overwrite() {
        let job = RunJob {
            kind: TechniqueKind::Filter,
            name: "LBF".to_string(),
            executable: PathBuf::from("/d/LBF/LBF"),
            output: PathBuf::from("/r/slot/denoisers/LBF/default"),
        };
        let args = benchmark_args(&job, Path::new("/r/slot/.run-config.json"), false);
        let args: Vec<String> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--config",
                "/r/slot/.run-config.json",
                "--filter",
                "/d/LBF/LBF",
                "--output",
                "/r/slot/denoisers/LBF/default",
                "--resume",
            ]
        );
        assert_eq!(benchmark_args(&job, Path::new("c.json"), true).len(), 6);
    }

    #[test]
    fn test_execute_runs_every_job_and_writes_run_document() {
        let temp = TempDir::new().unwrap();
        let catalog = catalog(temp.path());
        let config = Configuration::new(
            "cfg",
            &catalog.scene_ids(),
            &catalog.filters.version_ids(),
            &[],
            &[8],
        );
        let invoker = RecordingInvoker {
            calls: RefCell::new(Vec::new()),
            fail_on: Some("LBF"),
        };
        let slot = temp.path().join("results/slot1");
        let executor = BenchmarkExecutor::new(invoker, false);

        let summary = executor
            .execute(&config, &catalog, &temp.path().join("scenes"), &slot)
            .unwrap();

        assert_eq!(summary.failed, vec!["LBF".to_string()]);
        assert_eq!(summary.succeeded, vec!["NFOR".to_string()]);
        assert_eq!(executor.invoker.calls.borrow().len(), 2);
        assert!(slot.join("denoisers/NFOR/default").is_dir());

        let document: ConfigDocument = read_json(&slot.join(RUN_CONFIG_FILE)).unwrap();
        assert_eq!(document.renderers[0].scenes[0].spps, vec![8]);
        assert!(document.renderers[0].path.is_some());
    }

    #[test]
    fn test_execute_without_scenes_runs_nothing() {
        let temp = TempDir::new().unwrap();
        let catalog = catalog(temp.path());
        let config = Configuration::new("cfg", &[], &catalog.filters.version_ids(), &[], &[]);
        let invoker = RecordingInvoker {
            calls: RefCell::new(Vec::new()),
            fail_on: None,
        };
        let executor = BenchmarkExecutor::new(invoker, true);

        let summary = executor
            .execute(&config, &catalog, temp.path(), &temp.path().join("slot"))
            .unwrap();
        assert_eq!(summary, RunSummary::default());
        assert!(executor.invoker.calls.borrow().is_empty());
    }
}
