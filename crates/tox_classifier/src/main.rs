//! ToxTrack CLI
//!
//! Trains the edibility classifier from the reference dataset and answers
//! prediction requests against it.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use toxtrack_classifier::{ClassifierConfig, Engine, SpecimenBuilder, SpecimenRecord};
use toxtrack_core::serde_canon::to_canonical_json;
use toxtrack_core::{Attribute, AttributeGroup};

#[derive(Parser, Debug)]
#[command(name = "toxtrack")]
#[command(author = "ToxTrack Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deterministic mushroom edibility classifier", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Reference dataset path (overrides config and environment)
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict edibility for one specimen
    Predict {
        /// Attribute value as name=value; value is a code or catalog label
        #[arg(short, long = "set", value_name = "ATTR=VALUE")]
        set: Vec<String>,

        /// Start from the modal specimen and only override the given attributes
        #[arg(long)]
        fill_modal: bool,

        /// Print the prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the selectable values per attribute
    Options {
        /// Only list this attribute
        #[arg(short, long)]
        attribute: Option<String>,
    },

    /// Print the most frequent value of every attribute
    Modal,

    /// Write the trained model and its hash
    Export {
        /// Output directory for model and hash
        #[arg(short, long, default_value = "models/toxtrack")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::from_str(&config.logging.level).context("Invalid log level")?
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("ToxTrack classifier v{}", env!("CARGO_PKG_VERSION"));

    let engine = toxtrack_classifier::shared(&config).context("Failed to load classifier")?;

    match args.command {
        Command::Predict {
            set,
            fill_modal,
            json,
        } => predict(engine, &set, fill_modal, json),
        Command::Options { attribute } => options(engine, attribute.as_deref()),
        Command::Modal => modal(engine),
        Command::Export { output } => export(engine, &output),
    }
}

fn load_config(args: &Args) -> Result<ClassifierConfig> {
    let mut config = match &args.config {
        Some(path) => ClassifierConfig::load_from_file(path)?,
        None => ClassifierConfig::default(),
    };
    config.apply_env()?;
    if let Some(dataset) = &args.dataset {
        config.dataset_path = dataset.clone();
    }
    config.validate()?;
    Ok(config)
}

fn parse_assignment(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("expected ATTR=VALUE, got '{raw}'"),
    }
}

fn predict(engine: &Engine, assignments: &[String], fill_modal: bool, json: bool) -> Result<()> {
    let pairs = assignments
        .iter()
        .map(|raw| parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let specimen: SpecimenRecord = if fill_modal {
        let mut builder = SpecimenBuilder::from_record(engine.modal_record());
        for (name, value) in &pairs {
            let attribute = Attribute::from_str(name)?;
            builder.set_value(attribute, value)?;
        }
        builder.build()?
    } else {
        SpecimenRecord::from_labels(pairs)?
    };

    let prediction = engine.predict_detailed(&specimen)?;

    if json {
        let report = serde_json::json!({
            "specimen": specimen.to_map(),
            "label": prediction.label,
            "confidence": prediction.confidence(),
            "probabilities": prediction
                .probabilities
                .iter()
                .map(|(label, p)| (label.to_string(), *p))
                .collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{} ({}, confidence {:.1}%)",
            prediction.label.headline(),
            prediction.label,
            prediction.confidence() * 100.0
        );
    }

    Ok(())
}

fn options(engine: &Engine, only: Option<&str>) -> Result<()> {
    let only = only.map(Attribute::from_str).transpose()?;
    let valid = engine.valid_options();

    for group in AttributeGroup::ALL {
        let attributes: Vec<Attribute> = group
            .attributes()
            .filter(|a| only.map_or(true, |o| o == *a))
            .collect();
        if attributes.is_empty() {
            continue;
        }

        println!("{}", group.title());
        for attribute in attributes {
            let entries: Vec<String> = valid
                .for_attribute(attribute)
                .iter()
                .map(|(code, label)| format!("{label} ({code})"))
                .collect();
            println!("  {}: {}", attribute.display_name(), entries.join(", "));
        }
    }

    Ok(())
}

fn modal(engine: &Engine) -> Result<()> {
    for (attribute, code) in engine.modal_record().iter() {
        let label = attribute.label_for(code).unwrap_or("?");
        println!("{}={} ({})", attribute, code, label);
    }
    Ok(())
}

fn export(engine: &Engine, output: &Path) -> Result<()> {
    let model = engine.model();

    std::fs::create_dir_all(output).context("Failed to create output directory")?;

    // Save model as canonical JSON
    let model_path = output.join("model.json");
    info!("Saving model to: {}", model_path.display());
    let canonical_json = model.to_canonical_json().context("Failed to serialize model")?;
    std::fs::write(&model_path, &canonical_json).context("Failed to write model file")?;

    let encoders_path = output.join("encoders.json");
    info!("Saving encoders to: {}", encoders_path.display());
    let encoders = serde_json::json!({
        "columns": engine.encoder(),
        "targets": engine.target_encoder(),
    });
    let encoders_json = to_canonical_json(&encoders).context("Failed to serialize encoders")?;
    std::fs::write(&encoders_path, encoders_json).context("Failed to write encoders file")?;

    let hash_hex = model.hash_hex().context("Failed to hash model")?;
    let hash_path = output.join("model.hash");
    info!("Saving hash to: {}", hash_path.display());
    std::fs::write(&hash_path, &hash_hex).context("Failed to write hash file")?;

    info!("✓ Export completed");
    info!("  Model: {}", model_path.display());
    info!("  Hash: {} ({})", hash_path.display(), hash_hex);

    Ok(())
}
