//! @ai:module:intent CLI for the fbksd benchmark workspace
//! @ai:module:layer presentation

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fbksd::{
    compare::{CompareOptions, ExternalComparator, ResultComparer},
    configuration::{ConfigStore, Configuration},
    loader::{scan_scenes, scenes_from_ids, versions_from_ids, CatalogLoader, CatalogLoaderTrait},
    metrics::{rank_versions, CsvScales, Metric, MetricsAggregator, MetricsAggregatorTrait},
    model::{Catalog, SceneId, SceneScope, TechniqueKind, VersionId},
    report::{
        ChartGenerator, ChartGeneratorTrait, CsvReporter, CsvReporterTrait, ReportGenerator,
        SnapshotSelection, TextRenderer,
    },
    runner::{BenchmarkExecutor, ProcessInvoker},
    toolchain::{Tool, ToolchainValidator},
    workspace::Workspace,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fbksd")]
#[command(about = "Benchmark workspace manager for image denoisers and samplers")]
#[command(version)]
struct Cli {
    /// Workspace root
    #[arg(short, long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List scenes
    Scenes {
        /// Re-scan the scenes folder and rewrite the scenes cache
        #[arg(long)]
        update: bool,

        /// List only scenes of ready renderers
        #[arg(long)]
        ready: bool,
    },

    /// List all filters
    Filters,

    /// List all samplers
    Samplers,

    /// Show details about filters
    FilterInfo {
        #[arg(required = true, value_name = "FILTER_ID")]
        ids: Vec<u32>,
    },

    /// Show details about samplers
    SamplerInfo {
        #[arg(required = true, value_name = "SAMPLER_ID")]
        ids: Vec<u32>,
    },

    /// Manage configurations
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Run the benchmark with the current configuration
    Run {
        /// Overwrite previous results instead of resuming
        #[arg(long)]
        overwrite: bool,
    },

    /// Compute, show and export results
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },

    /// Manage result slots
    Slots {
        #[command(subcommand)]
        command: Option<SlotsCommand>,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// List configurations
    List,

    /// Create and select a new configuration
    New {
        name: String,

        #[arg(long, num_args = 1.., value_name = "SCENE_ID")]
        scenes: Vec<u32>,

        /// Include all scenes
        #[arg(long)]
        scenes_all: bool,

        #[arg(long, num_args = 1.., value_name = "FILTER_ID")]
        filters: Vec<u32>,

        /// Include all filters
        #[arg(long)]
        filters_all: bool,

        #[arg(long, num_args = 1.., value_name = "SAMPLER_ID")]
        samplers: Vec<u32>,

        /// Include all samplers
        #[arg(long)]
        samplers_all: bool,

        /// Sample counts (default: the workspace defaults)
        #[arg(long, num_args = 1.., value_name = "SPP")]
        spps: Vec<u32>,
    },

    /// Select a configuration
    Select {
        #[arg(value_name = "CONFIG_ID")]
        id: usize,
    },

    /// Show a configuration (default: the current one)
    Show {
        #[arg(long, value_name = "CONFIG_ID")]
        id: Option<usize>,
    },

    /// Add scenes to the current configuration
    AddScenes {
        #[arg(value_name = "SCENE_ID")]
        scenes: Vec<u32>,

        /// Sample counts of the added scenes
        #[arg(long, num_args = 1.., required = true, value_name = "SPP")]
        spps: Vec<u32>,

        /// Add all scenes
        #[arg(long)]
        all: bool,
    },

    /// Remove scenes from the current configuration
    RmScenes {
        #[arg(required = true, value_name = "SCENE_ID")]
        scenes: Vec<u32>,
    },

    /// Add filters to the current configuration
    AddFilters {
        #[arg(value_name = "FILTER_ID")]
        filters: Vec<u32>,

        /// Add all filters
        #[arg(long)]
        all: bool,
    },

    /// Remove filters from the current configuration
    RmFilters {
        #[arg(required = true, value_name = "FILTER_ID")]
        filters: Vec<u32>,
    },

    /// Add samplers to the current configuration
    AddSamplers {
        #[arg(value_name = "SAMPLER_ID")]
        samplers: Vec<u32>,

        /// Add all samplers
        #[arg(long)]
        all: bool,
    },

    /// Remove samplers from the current configuration
    RmSamplers {
        #[arg(required = true, value_name = "SAMPLER_ID")]
        samplers: Vec<u32>,
    },

    /// Add sample counts to the scenes of the current configuration
    AddSpps {
        #[arg(required = true, value_name = "SPP")]
        spps: Vec<u32>,

        /// Only these scenes
        #[arg(long, num_args = 1.., value_name = "SCENE_ID")]
        scenes: Vec<u32>,
    },

    /// Remove sample counts from the scenes of the current configuration
    RmSpps {
        #[arg(required = true, value_name = "SPP")]
        spps: Vec<u32>,

        /// Only these scenes
        #[arg(long, num_args = 1.., value_name = "SCENE_ID")]
        scenes: Vec<u32>,
    },
}

#[derive(Subcommand)]
enum ResultsCommand {
    /// Compute errors for the images in the current slot
    Compute {
        /// Recompute even when the error logs are up to date
        #[arg(long)]
        overwrite: bool,
    },

    /// Show result tables for the current configuration
    Show {
        /// Show all filters in the workspace
        #[arg(long)]
        filters_all: bool,

        /// Show all samplers in the workspace
        #[arg(long)]
        samplers_all: bool,

        /// Show all scenes in the workspace
        #[arg(long)]
        scenes_all: bool,

        #[command(flatten)]
        metrics: MetricFlags,
    },

    /// Rank techniques by their position across scenes, sample counts and metrics
    Rank {
        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        metrics: MetricFlags,
    },

    /// Print a CSV table with the errors
    ExportCsv {
        #[command(flatten)]
        selection: Selection,

        /// Sample counts to export (default: every sample count with results)
        #[arg(long, num_args = 1.., value_name = "SPP")]
        spps: Vec<u32>,

        /// Scale applied to mse values
        #[arg(long)]
        mse_scale: Option<f64>,

        /// Scale applied to rmse values
        #[arg(long)]
        rmse_scale: Option<f64>,

        /// Metrics to export (mse, psnr, ssim, rmse)
        #[arg(long, num_args = 1.., value_name = "METRIC")]
        metrics: Vec<Metric>,
    },

    /// Write the JSON snapshot read by the results page
    Update {
        /// Output folder
        #[arg(short, long, default_value = "page")]
        output: PathBuf,
    },

    /// Draw rank and error charts for the current configuration
    Charts {
        /// Output folder
        #[arg(short, long, default_value = "charts")]
        output: PathBuf,

        #[command(flatten)]
        metrics: MetricFlags,
    },
}

#[derive(Subcommand)]
enum SlotsCommand {
    /// List result slots
    List,

    /// Create and select a new slot
    New { name: String },

    /// Select another slot
    Select {
        #[arg(value_name = "SLOT_ID")]
        id: usize,
    },
}

#[derive(Args)]
struct MetricFlags {
    #[arg(long)]
    mse: bool,
    #[arg(long)]
    psnr: bool,
    #[arg(long)]
    ssim: bool,
    #[arg(long)]
    rmse: bool,
}

impl MetricFlags {
    /// @ai:intent Metrics picked by flags, or the given defaults when none is set
    /// @ai:effects pure
    fn selected(&self, defaults: &[Metric]) -> Vec<Metric> {
        let picked: Vec<Metric> = [
            (self.mse, Metric::Mse),
            (self.psnr, Metric::Psnr),
            (self.ssim, Metric::Ssim),
            (self.rmse, Metric::Rmse),
        ]
        .into_iter()
        .filter_map(|(on, metric)| on.then_some(metric))
        .collect();
        if picked.is_empty() {
            defaults.to_vec()
        } else {
            picked
        }
    }
}

#[derive(Args)]
struct Selection {
    /// Filter ids (default: all)
    #[arg(long, num_args = 1.., value_name = "FILTER_ID")]
    filters: Vec<u32>,

    /// Sampler ids; selects samplers instead of filters
    #[arg(long, num_args = 1.., value_name = "SAMPLER_ID")]
    samplers: Vec<u32>,

    /// Scene ids (default: all)
    #[arg(long, num_args = 1.., value_name = "SCENE_ID")]
    scenes: Vec<u32>,
}

impl Selection {
    /// @ai:intent Kind and versions selected; every filter when nothing is given
    /// @ai:effects pure
    fn versions(&self, catalog: &Catalog) -> (TechniqueKind, Vec<VersionId>) {
        if !self.samplers.is_empty() {
            let kind = TechniqueKind::Sampler;
            return (kind, versions_from_ids(catalog, kind, &self.samplers).found);
        }
        let kind = TechniqueKind::Filter;
        if self.filters.is_empty() {
            (kind, catalog.techniques(kind).version_ids())
        } else {
            (kind, versions_from_ids(catalog, kind, &self.filters).found)
        }
    }

    fn scenes(&self, catalog: &Catalog) -> Vec<SceneId> {
        scenes_from_ids(catalog, &self.scenes).found
    }
}

/// Metrics used by rank and export when none is requested.
const RANK_METRICS: [Metric; 3] = [Metric::Mse, Metric::Psnr, Metric::Ssim];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("fbksd=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let workspace = Workspace::open(&cli.workspace)
        .with_context(|| format!("Failed to open workspace {}", cli.workspace.display()))?;

    match cli.command {
        Commands::Scenes { update, ready } => list_scenes(&workspace, update, ready),
        Commands::Filters => list_techniques(&workspace, TechniqueKind::Filter),
        Commands::Samplers => list_techniques(&workspace, TechniqueKind::Sampler),
        Commands::FilterInfo { ids } => technique_info(&workspace, TechniqueKind::Filter, &ids),
        Commands::SamplerInfo { ids } => technique_info(&workspace, TechniqueKind::Sampler, &ids),
        Commands::Config { command } => config_command(&workspace, command),
        Commands::Run { overwrite } => run(&workspace, overwrite),
        Commands::Results { command } => results_command(&workspace, command),
        Commands::Slots { command } => slots_command(&workspace, command.unwrap_or(SlotsCommand::List)),
    }
}

/// @ai:effects fs:read
fn load_catalog(workspace: &Workspace, with_results: bool) -> Result<Catalog> {
    let loader = CatalogLoader::new();
    let catalog = if with_results {
        loader.load_with_results(workspace)?
    } else {
        loader.load(workspace)?
    };
    Ok(catalog)
}

/// @ai:intent Current configuration and its file
/// @ai:effects fs:read
fn current_config(store: &ConfigStore, catalog: &Catalog) -> Result<(Configuration, PathBuf)> {
    let name = store.current_name().ok_or(fbksd::Error::NoCurrentConfig)?;
    let path = store.path_of(&name);
    let (config, warnings) = Configuration::load(&path, catalog)?;
    if !warnings.is_empty() {
        println!("{} entries of '{}' do not match the workspace and were ignored", warnings.len(), name);
    }
    Ok((config, path))
}

/// @ai:intent Versions of a kind: all of them, or those with the given ids
/// @ai:effects pure
fn pick_versions(catalog: &Catalog, kind: TechniqueKind, ids: &[u32], all: bool) -> Vec<VersionId> {
    if all {
        catalog.techniques(kind).version_ids()
    } else {
        versions_from_ids(catalog, kind, ids).found
    }
}

/// @ai:intent Scenes: all of them, or those with the given ids (none when no id is given)
/// @ai:effects pure
fn pick_scenes(catalog: &Catalog, ids: &[u32], all: bool) -> Vec<SceneId> {
    if all {
        catalog.scene_ids()
    } else if ids.is_empty() {
        Vec::new()
    } else {
        scenes_from_ids(catalog, ids).found
    }
}

/// @ai:effects fs:read, fs:write
fn list_scenes(workspace: &Workspace, update: bool, ready: bool) -> Result<()> {
    if update {
        let cache = scan_scenes(&workspace.scenes_dir(), &workspace.config().paths.scenes_cache)?;
        let total: usize = cache.iter().map(|entry| entry.scenes.len()).sum();
        println!("Scenes cache updated: {} scenes from {} renderers", total, cache.len());
    }
    let catalog = load_catalog(workspace, true)?;
    print!("{}", TextRenderer::new().scenes(&catalog, ready));
    Ok(())
}

/// @ai:effects fs:read
fn list_techniques(workspace: &Workspace, kind: TechniqueKind) -> Result<()> {
    let catalog = load_catalog(workspace, false)?;
    let set = catalog.techniques(kind);
    if set.versions().is_empty() {
        println!("No {}s found.", kind);
        return Ok(());
    }
    print!("{}", TextRenderer::new().techniques(set));
    Ok(())
}

/// @ai:effects fs:read
fn technique_info(workspace: &Workspace, kind: TechniqueKind, ids: &[u32]) -> Result<()> {
    let catalog = load_catalog(workspace, false)?;
    let lookup = versions_from_ids(&catalog, kind, ids);
    for id in &lookup.unknown {
        println!("No {} with id {}", kind, id);
    }
    print!("{}", TextRenderer::new().technique_info(catalog.techniques(kind), &lookup.found));
    Ok(())
}

/// @ai:effects fs:read, fs:write
fn config_command(workspace: &Workspace, command: ConfigCommand) -> Result<()> {
    let store = ConfigStore::new(workspace.configs_dir());
    let renderer = TextRenderer::new();

    match command {
        ConfigCommand::List => {
            print!("{}", renderer.entries("CONFIGURATIONS", &store.list()?));
            return Ok(());
        }
        ConfigCommand::Select { id } => {
            let name = store.select(id)?;
            println!("Current configuration: {}", name);
            return Ok(());
        }
        _ => {}
    }

    let catalog = load_catalog(workspace, false)?;
    match command {
        ConfigCommand::New {
            name,
            scenes,
            scenes_all,
            filters,
            filters_all,
            samplers,
            samplers_all,
            spps,
        } => {
            let spps = if spps.is_empty() {
                workspace.config().defaults.spps.clone()
            } else {
                spps
            };
            let config = Configuration::new(
                name.as_str(),
                &pick_scenes(&catalog, &scenes, scenes_all),
                &pick_versions(&catalog, TechniqueKind::Filter, &filters, filters_all),
                &pick_versions(&catalog, TechniqueKind::Sampler, &samplers, samplers_all),
                &spps,
            );
            let path = store.create(&name, &config.to_document(&catalog))?;
            println!("Created and selected configuration '{}' ({})", name, path.display());
        }
        ConfigCommand::Show { id } => {
            let path = match id {
                Some(id) => store.path_by_index(id)?,
                None => {
                    let name = store.current_name().ok_or(fbksd::Error::NoCurrentConfig)?;
                    store.path_of(&name)
                }
            };
            let (config, _) = Configuration::load(&path, &catalog)?;
            print!("{}", renderer.configuration(&config, &catalog));
        }
        command => {
            let (mut config, path) = current_config(&store, &catalog)?;
            edit_config(&mut config, &catalog, command);
            config.save(&path, &catalog)?;
            print!("{}", renderer.configuration(&config, &catalog));
        }
    }
    Ok(())
}

/// @ai:intent Apply an editing subcommand to a configuration
/// @ai:effects state:write
fn edit_config(config: &mut Configuration, catalog: &Catalog, command: ConfigCommand) {
    match command {
        ConfigCommand::AddScenes { scenes, spps, all } => {
            for scene in pick_scenes(catalog, &scenes, all) {
                config.add_scene(scene, &spps);
            }
        }
        ConfigCommand::RmScenes { scenes } => {
            for scene in pick_scenes(catalog, &scenes, false) {
                config.remove_scene(scene);
            }
        }
        ConfigCommand::AddFilters { filters, all } => {
            for version in pick_versions(catalog, TechniqueKind::Filter, &filters, all) {
                config.add_version(TechniqueKind::Filter, version);
            }
        }
        ConfigCommand::RmFilters { filters } => {
            for version in pick_versions(catalog, TechniqueKind::Filter, &filters, false) {
                config.remove_version(TechniqueKind::Filter, version);
            }
        }
        ConfigCommand::AddSamplers { samplers, all } => {
            for version in pick_versions(catalog, TechniqueKind::Sampler, &samplers, all) {
                config.add_version(TechniqueKind::Sampler, version);
            }
        }
        ConfigCommand::RmSamplers { samplers } => {
            for version in pick_versions(catalog, TechniqueKind::Sampler, &samplers, false) {
                config.remove_version(TechniqueKind::Sampler, version);
            }
        }
        ConfigCommand::AddSpps { spps, scenes } => {
            let targets = pick_scenes(catalog, &scenes, false);
            config.add_sample_counts(&spps, (!scenes.is_empty()).then_some(targets.as_slice()));
        }
        ConfigCommand::RmSpps { spps, scenes } => {
            let targets = pick_scenes(catalog, &scenes, false);
            config.remove_sample_counts(&spps, (!scenes.is_empty()).then_some(targets.as_slice()));
        }
        ConfigCommand::List
        | ConfigCommand::New { .. }
        | ConfigCommand::Select { .. }
        | ConfigCommand::Show { .. } => {}
    }
}

/// @ai:intent Run the benchmark for every version of the current configuration
/// @ai:effects fs:write, io
fn run(workspace: &Workspace, overwrite: bool) -> Result<()> {
    let status = ToolchainValidator::validate(&workspace.config().tools);
    ToolchainValidator::log_warnings(&status);
    if !status.is_available(Tool::Benchmark) {
        bail!("The benchmark executable is not installed");
    }

    let catalog = load_catalog(workspace, false)?;
    let store = ConfigStore::new(workspace.configs_dir());
    let (config, _) = current_config(&store, &catalog)?;

    let executor = BenchmarkExecutor::new(
        ProcessInvoker::new(workspace.config().tools.benchmark_exec()),
        overwrite,
    );
    let summary = executor.execute(
        &config,
        &catalog,
        &workspace.scenes_dir(),
        &workspace.current_slot_dir(),
    )?;

    println!();
    println!("Benchmarked: {}", summary.succeeded.len());
    if !summary.failed.is_empty() {
        println!("Failed: {}", summary.failed.join(", "));
    }
    Ok(())
}

/// @ai:effects fs:read, fs:write, io
fn results_command(workspace: &Workspace, command: ResultsCommand) -> Result<()> {
    match command {
        ResultsCommand::Compute { overwrite } => compute_results(workspace, overwrite),
        ResultsCommand::Show {
            filters_all,
            samplers_all,
            scenes_all,
            metrics,
        } => show_results(workspace, [filters_all, samplers_all], scenes_all, &metrics),
        ResultsCommand::Rank { selection, metrics } => rank(workspace, &selection, &metrics),
        ResultsCommand::ExportCsv {
            selection,
            spps,
            mse_scale,
            rmse_scale,
            metrics,
        } => {
            let catalog = load_catalog(workspace, true)?;
            let (kind, versions) = selection.versions(&catalog);
            let scopes: Vec<SceneScope> = selection
                .scenes(&catalog)
                .into_iter()
                .map(|scene| {
                    if spps.is_empty() {
                        SceneScope::All(scene)
                    } else {
                        SceneScope::scoped(scene, spps.clone())
                    }
                })
                .collect();
            let metrics = if metrics.is_empty() { RANK_METRICS.to_vec() } else { metrics };
            let scales = CsvScales {
                mse: mse_scale.unwrap_or(1.0),
                rmse: rmse_scale.unwrap_or(1.0),
            };
            let table = MetricsAggregator::new().csv_table(
                &catalog,
                catalog.techniques(kind),
                &versions,
                &scopes,
                &metrics,
                scales,
            );
            CsvReporter::new().write(&table, std::io::stdout().lock())?;
            Ok(())
        }
        ResultsCommand::Update { output } => {
            let catalog = load_catalog(workspace, true)?;
            let selection = SnapshotSelection {
                scenes: catalog.scene_ids().into_iter().map(SceneScope::All).collect(),
                filters: catalog.filters.version_ids(),
                samplers: catalog.samplers.version_ids(),
            };
            let output = workspace.root().join(output);
            ReportGenerator::new().generate_snapshot(&catalog, &selection, &output)?;
            println!("Results page data written to {}", output.display());
            Ok(())
        }
        ResultsCommand::Charts { output, metrics } => charts(workspace, &output, &metrics),
    }
}

/// @ai:intent Compare every result image of the current slot against its reference
/// @ai:effects fs:read, fs:write, io
fn compute_results(workspace: &Workspace, overwrite: bool) -> Result<()> {
    let status = ToolchainValidator::validate(&workspace.config().tools);
    ToolchainValidator::log_warnings(&status);
    if !status.is_available(Tool::Compare) {
        bail!("The compare executable is not installed");
    }

    let catalog = load_catalog(workspace, false)?;
    let comparator = ExternalComparator::from_tools(&workspace.config().tools);
    let comparer = ResultComparer::new(&comparator, workspace.scenes_dir())?;
    let options = CompareOptions {
        overwrite,
        ..Default::default()
    };

    for kind in TechniqueKind::ALL {
        let root = workspace.kind_results_dir(kind);
        if !root.is_dir() {
            continue;
        }
        let outcome = comparer.compare_kind(&catalog, kind, &root, &options);
        println!(
            "{}: {} computed, {} up to date, {} failed, {} skipped",
            kind.heading(),
            outcome.recomputed,
            outcome.up_to_date,
            outcome.failed,
            outcome.skipped.len()
        );
    }
    Ok(())
}

/// @ai:effects fs:read
fn show_results(
    workspace: &Workspace,
    all_versions: [bool; 2],
    scenes_all: bool,
    metrics: &MetricFlags,
) -> Result<()> {
    let catalog = load_catalog(workspace, true)?;
    let store = ConfigStore::new(workspace.configs_dir());
    let (config, _) = current_config(&store, &catalog)?;

    let scopes = if scenes_all {
        catalog.scene_ids().into_iter().map(SceneScope::All).collect()
    } else {
        config.scopes()
    };
    let metrics = metrics.selected(&workspace.config().defaults.metrics);
    let aggregator = MetricsAggregator::new();
    let renderer = TextRenderer::new();

    for (kind, all) in TechniqueKind::ALL.into_iter().zip(all_versions) {
        let set = catalog.techniques(kind);
        let versions = if all {
            set.version_ids()
        } else {
            config.versions(kind).to_vec()
        };
        if versions.is_empty() {
            continue;
        }
        println!("{}\n", kind.heading());
        let tables = aggregator.scene_tables(&catalog, set, &versions, &scopes, &metrics);
        println!("{}", renderer.tables(tables.iter().map(|t| &t.table)));
        for metric in &metrics {
            let table = aggregator.mean_error_table(&catalog, set, &versions, &scopes, *metric);
            if table.has_data() {
                println!("{}", renderer.table(&table));
            }
        }
    }
    Ok(())
}

/// @ai:effects fs:read
fn rank(workspace: &Workspace, selection: &Selection, metrics: &MetricFlags) -> Result<()> {
    let catalog = load_catalog(workspace, true)?;
    let (kind, versions) = selection.versions(&catalog);
    let scenes = selection.scenes(&catalog);
    if versions.is_empty() || scenes.is_empty() {
        println!("No results");
        return Ok(());
    }

    let set = catalog.techniques(kind);
    let metrics = metrics.selected(&RANK_METRICS);
    let scopes: Vec<SceneScope> = scenes.iter().copied().map(SceneScope::All).collect();
    let aggregator = MetricsAggregator::new();
    let renderer = TextRenderer::new();

    for metric in &metrics {
        let table = aggregator.mean_error_table(&catalog, set, &versions, &scopes, *metric);
        if table.has_data() {
            println!("{}", renderer.table(&table));
        }
    }
    let ranking = rank_versions(set, &versions, &scenes, &metrics);
    print!("{}", renderer.ranking(&ranking, set));
    Ok(())
}

/// @ai:effects fs:read, fs:write
fn charts(workspace: &Workspace, output: &std::path::Path, metrics: &MetricFlags) -> Result<()> {
    let catalog = load_catalog(workspace, true)?;
    let store = ConfigStore::new(workspace.configs_dir());
    let (config, _) = current_config(&store, &catalog)?;
    let metrics = metrics.selected(&workspace.config().defaults.metrics);
    let scopes = config.scopes();
    let scenes: Vec<SceneId> = scopes.iter().map(SceneScope::scene).collect();
    let aggregator = MetricsAggregator::new();
    let generator = ChartGenerator::new();

    for kind in TechniqueKind::ALL {
        let versions = config.versions(kind);
        if versions.is_empty() {
            continue;
        }
        let set = catalog.techniques(kind);
        let ranking = rank_versions(set, versions, &scenes, &metrics);
        let tables = aggregator.scene_tables(&catalog, set, versions, &scopes, &metrics);
        let dir = workspace.root().join(output).join(kind.results_dir_name());
        let files = generator.generate_all(&catalog, &ranking, &tables, &dir)?;
        println!("{}: {} charts written to {}", kind.heading(), files.len(), dir.display());
    }
    Ok(())
}

/// @ai:effects fs:read, fs:write
fn slots_command(workspace: &Workspace, command: SlotsCommand) -> Result<()> {
    match command {
        SlotsCommand::List => {
            print!("{}", TextRenderer::new().entries("SLOTS", &workspace.slots()?));
        }
        SlotsCommand::New { name } => {
            workspace.create_slot(&name)?;
            println!("Created and selected slot '{}'", name);
        }
        SlotsCommand::Select { id } => {
            let name = workspace.select_slot(id)?;
            println!("Current slot: {}", name);
        }
    }
    Ok(())
}
