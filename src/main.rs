use clap::{Parser, Subcommand};
use llms_index::attachments::{self, ATTACHMENTS_URL_DIR, FsReader};
use llms_index::cache::{self, CacheManifest};
use llms_index::classify::RouteFilter;
use llms_index::config::{self, CONFIG_FILENAME, PluginConfig, Purpose};
use llms_index::copy_content::{self, COPY_CONTENT_FILENAME};
use llms_index::generate::{self, GenerateInput};
use llms_index::output;
use llms_index::report::Reporter;
use llms_index::resolve::{self, ConfigResolver};
use llms_index::types::{Route, SiteManifest};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "llms-index")]
#[command(about = "Build llms.txt for a documentation site")]
#[command(long_about = "\
Build llms.txt for a documentation site

Reads the site's route catalogue (a JSON manifest produced by the site build)
and writes a markdown index of it for language models.

Manifest structure:

  {
    \"site\": { \"title\": \"Acme\", \"url\": \"https://acme.dev\", \"baseUrl\": \"/\" },
    \"routes\": [
      {
        \"path\": \"/docs/intro\",
        \"plugin\": \"docusaurus-plugin-content-docs\",   # or \"component\"
        \"isVersioned\": false,
        \"title\": \"Introduction\",
        \"description\": \"Start here\",
        \"markdownFile\": \"docs/intro.md\",            # link target
        \"content\": \"# Introduction ...\"             # body for llms-full.txt
      }
    ]
  }

Output:

  <out-dir>/
  ├── llms.txt                        # the index
  ├── llms-full.txt                   # every page inlined (optional)
  ├── llms-copy-content.json          # copy button data (optional)
  ├── .llms-txt-cache.json            # route snapshot for 'check'
  └── assets/llms-txt/attachments/    # published attachments

Run 'llms-index gen-config' to generate a documented llms-txt.toml.")]
#[command(version)]
struct Cli {
    /// Site directory; attachment sources are relative to it
    #[arg(long, default_value = ".", global = true)]
    site_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "build", global = true)]
    out_dir: PathBuf,

    /// Config file [default: <site-dir>/llms-txt.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write llms.txt (and friends) from a route manifest
    Generate {
        /// Route manifest JSON
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Compare a route manifest and the current config against the cache
    Check {
        /// Route manifest JSON
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Print a stock llms-txt.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.site_dir.join(CONFIG_FILENAME));
    let config = config::load_config(&config_path)?;
    init_tracing(config.log_level);

    match cli.command {
        Command::Generate { manifest } => {
            let site = read_manifest(&manifest)?;
            run_generate(&cli.site_dir, &cli.out_dir, &site, &config)?;
        }
        Command::Check { manifest } => {
            let site = read_manifest(&manifest)?;
            run_check(&cli.out_dir, &site, &config)?;
        }
        Command::GenConfig => {}
    }

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over the config level.
fn init_tracing(log_level: u8) {
    let default_level = match log_level {
        0 => "error",
        1 => "warn",
        2 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_manifest(path: &Path) -> Result<SiteManifest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn run_generate(
    site_dir: &Path,
    out_dir: &Path,
    site: &SiteManifest,
    config: &PluginConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = Reporter::for_config(config);

    println!("==> Reading attachments from {}", site_dir.display());
    let collected = resolve::collect_attachments(&config.llms_txt);
    let batch = attachments::process_attachments(&collected, site_dir, &FsReader, &mut reporter);

    println!("==> Generating → {}", out_dir.display());
    let result = generate::generate(
        GenerateInput {
            site: &site.site,
            routes: &site.routes,
            attachments: &batch.processed,
        },
        config,
        reporter,
    )?;

    std::fs::create_dir_all(out_dir)?;
    for file in result.llms_txt.iter().chain(&result.llms_full_txt) {
        std::fs::write(out_dir.join(&file.path), &file.content)?;
    }

    if !batch.processed.is_empty() {
        let attachments_dir = out_dir.join(ATTACHMENTS_URL_DIR.trim_start_matches('/'));
        std::fs::create_dir_all(&attachments_dir)?;
        for attachment in &batch.processed {
            std::fs::write(attachments_dir.join(&attachment.file_name), &attachment.content)?;
        }
    }

    let ui = config.ui.resolved_copy_page_content();
    if ui.enabled {
        let data = copy_content::build_copy_content_data(
            &result.processed_routes,
            &ui,
            &config.markdown.content_selectors,
        )?;
        let json = serde_json::to_string_pretty(&data)?;
        std::fs::write(out_dir.join(COPY_CONTENT_FILENAME), json)?;
    }

    result.cache.save(out_dir)?;
    output::print_generate_output(&result, &batch.processed);
    Ok(())
}

fn run_check(
    out_dir: &Path,
    site: &SiteManifest,
    config: &PluginConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let routes: Vec<&Route> = site.routes.iter().map(|e| &e.route).collect();
    let stored = CacheManifest::load(out_dir);
    let status = stored.status_for(&routes);
    let filter = RouteFilter::new(config.include_filter(Purpose::Index))?;

    // Only a manifest written for this catalogue says what was indexed
    // before. Otherwise snapshot the catalogue fresh and skip the comparison.
    let (manifest, change) = if status == cache::CacheStatus::Current {
        let change = cache::would_filtering_change(&stored, config)?;
        (stored, Some(change))
    } else {
        let fresh = CacheManifest::build(&site.routes, &ConfigResolver::new(config)?);
        (fresh, None)
    };

    let (_, stats) = cache::filter_cached_routes(&manifest.routes, &filter);
    output::print_check_output(status, &manifest.routes, &stats, change.as_ref());
    Ok(())
}
