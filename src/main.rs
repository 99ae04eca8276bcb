//! Bindkit CLI - binding expressions, formatters and flow variables

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::Value;

use bindkit::ast::FlowDocument;
use bindkit::catalog::{Field, FieldCatalog, FieldType};
use bindkit::config::BindkitConfig;
use bindkit::dag::validate_refs;
use bindkit::error::{BindError, FixSuggestion, Result};
use bindkit::expr::{self, Codec, Segment, Syntax};
use bindkit::format::{formatters_for, FormatterEngine, FormatterId, Locale};
use bindkit::resolve::{CapabilityRegistry, Resolver, VariableEntry, VariableScope};

#[derive(Parser)]
#[command(name = "bindkit")]
#[command(about = "Bindkit - binding expressions, formatters and flow variables")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/bindkit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override display locale (en-US, en-GB, de-DE, fr-FR)
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Override wire syntax (escaped, legacy)
    #[arg(long, global = true)]
    syntax: Option<Syntax>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a binding expression into segments
    Parse {
        /// Raw expression, e.g. "Hello {{name|titlecase}}!"
        expr: String,

        /// Print segments as JSON
        #[arg(long)]
        json: bool,
    },

    /// Format a single value
    Format {
        /// Value as JSON (falls back to a plain string)
        value: String,

        /// Formatter id (see `bindkit formatters`)
        formatter: String,
    },

    /// List formatters, optionally only those offered for a field type
    Formatters {
        /// Field type (text, number, date, boolean, object)
        #[arg(short = 't', long = "type")]
        field_type: Option<FieldType>,
    },

    /// Render an expression with values, or preview it from a catalog
    Render {
        expr: String,

        /// JSON object of field values
        #[arg(long)]
        values: Option<PathBuf>,

        /// YAML/JSON list of {name, type} used for sample values
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// List the variables visible at a node of a flow
    Vars {
        /// Path to flow YAML file
        flow: PathBuf,

        /// Target node id
        node: String,

        /// Capability table (YAML), merged under inline capabilities
        #[arg(long)]
        capabilities: Option<PathBuf>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check every node binding of a flow against its visible variables
    Check {
        /// Path to flow YAML file
        flow: PathBuf,

        /// Capability table (YAML), merged under inline capabilities
        #[arg(long)]
        capabilities: Option<PathBuf>,
    },
}

fn main() {
    // Load .env file (ignore if not present)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref(), cli.locale, cli.syntax)?;

    match cli.command {
        Commands::Parse { expr, json } => parse_expr(&expr, json, &config),
        Commands::Format { value, formatter } => format_value(&value, &formatter, &config),
        Commands::Formatters { field_type } => list_formatters(field_type),
        Commands::Render {
            expr,
            values,
            catalog,
        } => render_expr(&expr, values.as_deref(), catalog.as_deref(), &config),
        Commands::Vars {
            flow,
            node,
            capabilities,
            json,
        } => list_vars(&flow, &node, capabilities.as_deref(), json, &config),
        Commands::Check { flow, capabilities } => {
            check_flow(&flow, capabilities.as_deref(), &config)
        }
    }
}

/// File (explicit or default) → environment → flags
fn load_config(
    path: Option<&Path>,
    locale: Option<Locale>,
    syntax: Option<Syntax>,
) -> Result<BindkitConfig> {
    let mut config = match path {
        Some(path) => BindkitConfig::load_from(path)?,
        None => BindkitConfig::load()?,
    }
    .with_env()?;

    if let Some(locale) = locale {
        config.locale = locale;
    }
    if let Some(syntax) = syntax {
        config.syntax = syntax;
    }
    Ok(config)
}

fn parse_expr(raw: &str, json: bool, config: &BindkitConfig) -> Result<()> {
    let expr = expr::parse_with(raw, config.syntax);

    if json {
        println!("{}", serde_json::to_string_pretty(&expr)?);
        return Ok(());
    }

    for (id, segment) in expr.iter() {
        let detail = match segment {
            Segment::Literal { text } | Segment::NumberLiteral { text } => format!("{:?}", text),
            Segment::FieldRef {
                field,
                formatter: Some(formatter),
            } => format!("{} | {}", field.cyan(), formatter.yellow()),
            Segment::FieldRef { field, .. } => field.cyan().to_string(),
        };
        println!("{:>4}  {:<14} {}", id.to_string(), segment.kind().as_str(), detail);
    }
    println!(
        "{} {} segment(s), canonical: {}",
        "✓".green(),
        expr.len(),
        expr::serialize_with(&expr, config.syntax)
    );

    Ok(())
}

fn format_value(raw: &str, formatter: &str, config: &BindkitConfig) -> Result<()> {
    let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));

    if FormatterId::from_id(formatter).is_none() {
        tracing::warn!(formatter, "unknown formatter, printing value unchanged");
    }

    println!("{}", FormatterEngine::new(config.locale).format(&value, formatter));
    Ok(())
}

fn list_formatters(field_type: Option<FieldType>) -> Result<()> {
    let ids = match field_type {
        Some(field_type) => formatters_for(field_type),
        None => FormatterId::ALL.to_vec(),
    };

    println!("{:<16} {:<10} {}", "ID", "CATEGORY", "LABEL");
    println!("{}", "-".repeat(44));
    for id in ids {
        println!("{:<16} {:<10} {}", id.as_str(), id.category().as_str(), id.label());
    }
    Ok(())
}

fn render_expr(
    raw: &str,
    values: Option<&Path>,
    catalog: Option<&Path>,
    config: &BindkitConfig,
) -> Result<()> {
    let codec = Codec::new(config.syntax);
    let expr = codec.parse(raw);
    let engine = FormatterEngine::new(config.locale);

    let values: Option<Value> = match values {
        Some(path) => Some(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => None,
    };

    let rendered = match catalog {
        Some(path) => {
            let fields: Vec<Field> = serde_yaml::from_str(&fs::read_to_string(path)?)?;
            let catalog = FieldCatalog::new(fields);
            for field in catalog.unresolved(&expr) {
                eprintln!("{} '{}' is not in the catalog", "⚠".yellow(), field);
            }
            let live = values.as_ref().map(|v| v as &dyn expr::ValueLookup);
            expr::preview(&expr, &catalog, live, &engine)
        }
        None => expr::render(&expr, &values.unwrap_or(Value::Null), &engine),
    };

    println!("{}", rendered);
    Ok(())
}

/// Flow document + capability table (inline entries win)
fn load_flow(flow: &Path, capabilities: Option<&Path>) -> Result<(FlowDocument, CapabilityRegistry)> {
    let doc = FlowDocument::load(flow)?;
    let base = match capabilities {
        Some(path) => CapabilityRegistry::load(path)?,
        None => CapabilityRegistry::new(),
    };
    let caps = doc.capabilities_over(base);
    Ok((doc, caps))
}

fn list_vars(
    flow: &Path,
    node: &str,
    capabilities: Option<&Path>,
    json: bool,
    config: &BindkitConfig,
) -> Result<()> {
    let (doc, caps) = load_flow(flow, capabilities)?;
    doc.require_node(node)?;

    let graph = doc.graph();
    let observed = doc.observed_store();
    let entries = Resolver::new(&graph, &caps)
        .with_observed(&observed)
        .with_preview_len(config.preview_len)
        .resolve(node, &doc.globals());

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No variables visible at '{}'", node);
        return Ok(());
    }

    print_group("Global", &entries, VariableScope::Global);
    print_group("Upstream", &entries, VariableScope::Node);
    Ok(())
}

fn print_group(title: &str, entries: &[VariableEntry], scope: VariableScope) {
    let group: Vec<&VariableEntry> = entries.iter().filter(|e| e.scope == scope).collect();
    if group.is_empty() {
        return;
    }

    println!("{} ({})", title.cyan().bold(), group.len());
    for entry in group {
        println!(
            "  {:<28} {:<22} {:<8} {:<16} {}",
            entry.path,
            entry.friendly_name,
            entry.field_type.as_str(),
            entry.source_label,
            entry.value_preview.as_deref().unwrap_or("").dimmed()
        );
    }
}

fn check_flow(flow: &Path, capabilities: Option<&Path>, config: &BindkitConfig) -> Result<()> {
    let (doc, caps) = load_flow(flow, capabilities)?;
    let graph = doc.graph();
    let observed = doc.observed_store();
    let globals = doc.globals();
    let resolver = Resolver::new(&graph, &caps)
        .with_observed(&observed)
        .with_preview_len(config.preview_len);

    if let Some(cycle) = graph.find_cycle() {
        let path: Vec<&str> = cycle.iter().map(AsRef::as_ref).collect();
        println!("{} cycle: {}", "⚠".yellow(), path.join(" → "));
    }

    let mut issues = 0usize;
    let mut bindings = 0usize;

    for node in &doc.nodes {
        if node.bindings.is_empty() {
            continue;
        }
        let visible = resolver.resolve(&node.id, &globals);

        for (name, raw) in &node.bindings {
            bindings += 1;
            let expr = expr::parse_with(raw, config.syntax);

            for (_, formatter) in expr.field_refs() {
                if let Some(formatter) = formatter.filter(|f| FormatterId::from_id(f).is_none()) {
                    println!(
                        "{} {}.{}: unknown formatter '{}' (renders unformatted)",
                        "⚠".yellow(),
                        node.id,
                        name,
                        formatter
                    );
                }
            }

            for unresolved in validate_refs(&expr, &graph, &visible, &node.id) {
                issues += 1;
                println!(
                    "{} {}.{}: {}",
                    "✗".red(),
                    node.id,
                    name,
                    unresolved.message(&node.id)
                );
            }
        }
    }

    if issues > 0 {
        return Err(BindError::UnresolvedRefs { count: issues });
    }

    println!(
        "{} Flow '{}' is valid ({} node(s), {} binding(s))",
        "✓".green(),
        flow.display(),
        doc.nodes.len(),
        bindings
    );
    Ok(())
}
