use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use themekit::a11y::{builtin_presets, AccessibilityEngine, AccessibilitySettings};
use themekit::host::{DirFetcher, DocTarget, Dom, KeyValueStore, MemoryDom, MemoryHost};
use themekit::theme::core_tokens::{render_core_tokens_css, scan_theme_dir};
use themekit::theme::{load_preview_tokens, preview_property_name, ThemeSwitcher, PREVIEW_SLOTS};
use themekit::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "themekit", version)]
#[command(about = "Theme catalog, token and accessibility settings tooling")]
struct Cli {
    /// JSON engine config; every field is optional
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the theme catalog in cycling order
    Themes,
    /// Generate coretokens.css from a directory of theme stylesheets
    CoreTokens {
        /// Directory scanned recursively for `.css` files
        dir: PathBuf,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Resolve theme card preview properties from a site checkout
    Preview {
        /// Directory that site-absolute stylesheet urls resolve against
        site_root: PathBuf,
    },
    /// Show what a settings record (optionally with a preset) applies
    Settings {
        /// Merge this preset over the input settings
        #[arg(long)]
        preset: Option<String>,
        /// Persisted settings JSON; defaults when omitted
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print a JSON schema
    Schema {
        #[arg(value_enum)]
        kind: SchemaKind,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SchemaKind {
    Settings,
    Config,
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(EngineConfig::default()),
    }
}

fn list_themes(config: &EngineConfig) {
    for theme in &config.themes {
        let marker = if theme.id == config.default_theme { "*" } else { " " };
        println!(
            "{} {:<22} {:<28} {}",
            marker,
            theme.id,
            theme.display_name(),
            theme.stylesheet_url
        );
    }
}

fn core_tokens(dir: &Path, output: Option<&Path>) -> Result<()> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let entries =
        scan_theme_dir(dir).with_context(|| format!("failed to scan {}", dir.display()))?;
    let css = render_core_tokens_css(&entries);
    match output {
        Some(path) => {
            std::fs::write(path, css)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote {} themes to {}", entries.len(), path.display());
        }
        None => print!("{}", css),
    }
    Ok(())
}

async fn preview(config: &EngineConfig, site_root: &Path) -> Result<()> {
    if !site_root.is_dir() {
        bail!("{} is not a directory", site_root.display());
    }
    let fetcher = DirFetcher::new(site_root);
    let dom = MemoryDom::new();
    let written = load_preview_tokens(&fetcher, &dom, &config.preview_sources).await;

    println!(":root {{");
    for source in &config.preview_sources {
        for slot in PREVIEW_SLOTS {
            let property = preview_property_name(&source.key, slot);
            if let Some(value) = dom.style(DocTarget::Root, &property) {
                println!("  {}: {};", property, value);
            }
        }
    }
    println!("}}");
    tracing::info!("Resolved {} preview properties", written);
    Ok(())
}

fn settings(config: EngineConfig, preset: Option<&str>, input: Option<&Path>) -> Result<()> {
    let host = MemoryHost::new();
    if let Some(path) = input {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        host.store.set(&config.storage.settings, &json)?;
    }
    host.dom.ensure_theme_link(&config.link_element_id);

    let switcher = ThemeSwitcher::new(host.host(), config.clone());
    let engine = AccessibilityEngine::new(host.host(), config, switcher.clone());
    let restored = engine.restore();
    host.dom.complete_link_load();

    let mut theme_switch = restored.theme_switch;
    if let Some(name) = preset {
        let Some(outcome) = engine.apply_preset(name) else {
            let known: Vec<&str> = builtin_presets().iter().map(|(name, _)| *name).collect();
            bail!("unknown preset {} (known: {})", name, known.join(", "));
        };
        host.dom.complete_link_load();
        theme_switch = outcome.theme_switch;
    }
    if let Some(Err(e)) = theme_switch.try_result() {
        tracing::warn!("{}", e);
    }

    let settings: AccessibilitySettings = engine.settings();
    let styles: serde_json::Map<String, serde_json::Value> = [
        (DocTarget::Root, "font-size"),
        (DocTarget::Body, "letter-spacing"),
        (DocTarget::Body, "word-spacing"),
        (DocTarget::Body, "line-height"),
    ]
    .into_iter()
    .filter_map(|(target, property)| {
        host.dom
            .style(target, property)
            .map(|value| (property.to_string(), value.into()))
    })
    .collect();

    let report = serde_json::json!({
        "settings": settings,
        "theme": switcher.current_theme(),
        "bodyClasses": host.dom.classes(DocTarget::Body),
        "styles": styles,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn schema(kind: SchemaKind) -> Result<()> {
    let schema = match kind {
        SchemaKind::Settings => schemars::schema_for!(AccessibilitySettings),
        SchemaKind::Config => schemars::schema_for!(EngineConfig),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Themes => {
            list_themes(&config);
            Ok(())
        }
        Command::CoreTokens { dir, output } => core_tokens(&dir, output.as_deref()),
        Command::Preview { site_root } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .context("failed to start runtime")?;
            runtime.block_on(preview(&config, &site_root))
        }
        Command::Settings { preset, input } => {
            settings(config, preset.as_deref(), input.as_deref())
        }
        Command::Schema { kind } => schema(kind),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
