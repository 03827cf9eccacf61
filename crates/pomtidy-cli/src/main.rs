use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pomtidy::{Layout, Pipeline, PipelineConfig, PromotionConfig, SortConfig};

#[derive(Debug, Parser)]
#[command(
    name = "pomtidy",
    version,
    about = "Normalize, sort and tidy Maven POM files"
)]
struct Args {
    /// Input POM (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Reorder top-level elements to the prototype layout
    #[arg(long, overrides_with = "no_organize")]
    organize: bool,
    #[arg(long, overrides_with = "organize", hide = true)]
    no_organize: bool,

    /// Indent the output (default)
    #[arg(long, overrides_with = "compact")]
    pretty: bool,
    /// Write the output without inserted whitespace
    #[arg(long, overrides_with = "pretty")]
    compact: bool,
    /// Spaces per indentation level when pretty printing
    #[arg(long, value_name = "WIDTH", default_value_t = 4)]
    indent: usize,

    /// Add the common encoding properties when missing (default)
    #[arg(long, overrides_with = "no_common_properties")]
    common_properties: bool,
    #[arg(long, overrides_with = "common_properties", hide = true)]
    no_common_properties: bool,

    /// Put dependency children in canonical order, dropping default scope/type (default)
    #[arg(long, overrides_with = "no_normalize_dependencies")]
    normalize_dependencies: bool,
    #[arg(long, overrides_with = "normalize_dependencies", hide = true)]
    no_normalize_dependencies: bool,

    /// Sort dependency sections by coordinates (default)
    #[arg(long, overrides_with = "no_sort_dependencies")]
    sort_dependencies: bool,
    #[arg(long, overrides_with = "sort_dependencies", hide = true)]
    no_sort_dependencies: bool,

    /// Group sorted dependencies by scope
    #[arg(long, overrides_with = "no_sort_by_scope")]
    sort_by_scope: bool,
    #[arg(long, overrides_with = "sort_by_scope", hide = true)]
    no_sort_by_scope: bool,

    /// Put plugin children in canonical order, adding a default groupId (default)
    #[arg(long, overrides_with = "no_normalize_plugins")]
    normalize_plugins: bool,
    #[arg(long, overrides_with = "normalize_plugins", hide = true)]
    no_normalize_plugins: bool,

    /// Move literal versions into properties (default)
    #[arg(long, overrides_with = "no_promote_versions")]
    promote_versions: bool,
    #[arg(long, overrides_with = "promote_versions", hide = true)]
    no_promote_versions: bool,

    /// Rename existing version properties to the naming convention
    #[arg(long, overrides_with = "no_replace_existing_properties")]
    replace_existing_properties: bool,
    #[arg(long, overrides_with = "replace_existing_properties", hide = true)]
    no_replace_existing_properties: bool,

    /// Promote plugin versions too (default)
    #[arg(long, overrides_with = "no_convert_plugin_versions")]
    convert_plugin_versions: bool,
    #[arg(long, overrides_with = "convert_plugin_versions", hide = true)]
    no_convert_plugin_versions: bool,

    /// Always name properties of this group with the artifact id (repeatable)
    #[arg(long = "qualify-group", value_name = "GROUP")]
    qualify_groups: Vec<String>,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Resolve an enable/disable flag pair; the later flag already cleared the other
fn switch(enable: bool, disable: bool, default: bool) -> bool {
    if enable {
        true
    } else if disable {
        false
    } else {
        default
    }
}

impl Args {
    fn pipeline_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        let layout = if switch(self.pretty, self.compact, true) {
            Layout::Pretty {
                indent: self.indent,
            }
        } else {
            Layout::Compact
        };

        PipelineConfig {
            insert_common_properties: switch(
                self.common_properties,
                self.no_common_properties,
                defaults.insert_common_properties,
            ),
            normalize_dependencies: switch(
                self.normalize_dependencies,
                self.no_normalize_dependencies,
                defaults.normalize_dependencies,
            ),
            sort: SortConfig {
                enabled: switch(
                    self.sort_dependencies,
                    self.no_sort_dependencies,
                    defaults.sort.enabled,
                ),
                by_scope: switch(
                    self.sort_by_scope,
                    self.no_sort_by_scope,
                    defaults.sort.by_scope,
                ),
            },
            normalize_plugins: switch(
                self.normalize_plugins,
                self.no_normalize_plugins,
                defaults.normalize_plugins,
            ),
            promotion: PromotionConfig {
                enabled: switch(
                    self.promote_versions,
                    self.no_promote_versions,
                    defaults.promotion.enabled,
                ),
                replace_existing: switch(
                    self.replace_existing_properties,
                    self.no_replace_existing_properties,
                    defaults.promotion.replace_existing,
                ),
                convert_plugins: switch(
                    self.convert_plugin_versions,
                    self.no_convert_plugin_versions,
                    defaults.promotion.convert_plugins,
                ),
                qualified_groups: self.qualify_groups.iter().cloned().collect(),
            },
            organize: switch(self.organize, self.no_organize, defaults.organize),
            layout,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // configuration problems are reported before any input is read
    let pipeline = Pipeline::new(args.pipeline_config()).context("invalid configuration")?;
    debug!(config = ?pipeline.config(), "pipeline configured");

    let input = read_input(args.input.as_deref())?;
    let output = pipeline
        .process_str(&input)
        .with_context(|| format!("failed to process {}", describe(args.input.as_deref())))?;

    write_output(args.output.as_deref(), output.as_bytes())?;
    info!(bytes = output.len(), "wrote {}", describe_output(args.output.as_deref()));
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

/// Write the whole document; the file handle is released when the writer drops
fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            writer
                .write_all(data)
                .and_then(|()| writer.flush())
                .with_context(|| format!("failed to write output file {}", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(data)
                .and_then(|()| stdout.flush())
                .context("failed to write stdout")
        }
    }
}

fn describe(path: Option<&Path>) -> String {
    path.map_or_else(|| "stdin".to_string(), |path| path.display().to_string())
}

fn describe_output(path: Option<&Path>) -> String {
    path.map_or_else(|| "stdout".to_string(), |path| path.display().to_string())
}
