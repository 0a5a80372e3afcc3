use clap::{Parser, ValueEnum};
use color_eyre::Result;
use std::path::PathBuf;
use titlestat::{render, source, AnalysisContext, ConfigManager, APP_NAME};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(version, about = "titlestat")]
struct Args {
    /// Path to the cleaned catalog CSV
    path: PathBuf,

    /// Output format
    #[arg(long = "format", value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Analyze only the named field (repeatable); all configured fields by default
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Override the z-score cutoff for every field
    #[arg(long = "z-threshold")]
    z_threshold: Option<f64>,

    /// Use an explicit config file instead of the default location
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => titlestat::config::load_config_file(path)?,
        None => ConfigManager::new(APP_NAME)?.load()?,
    };
    if let Some(z) = args.z_threshold {
        for field in &mut config.fields {
            field.z_threshold = Some(z);
        }
    }

    let df = source::load_catalog(&args.path, &config)?;
    let ctx = AnalysisContext::new(df, config);
    let report = if args.fields.is_empty() {
        ctx.analyze_all()?
    } else {
        ctx.analyze_fields(&args.fields)?
    };

    match args.format {
        OutputFormat::Text => print!("{}", render::render_report(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    run(&args)
}
