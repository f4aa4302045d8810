//! Command-line front end: build one composition and export it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use thumbnail_composer::{
    AccentColor, BadgeCatalog, Composer, Configurable, DirectorySaver, ThumbnailConfig,
    ThumbnailProfile,
};

/// Compose a project thumbnail and export it as PNG.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Background image (PNG or JPEG).
    #[arg(long)]
    image: Option<PathBuf>,

    /// Title text.
    #[arg(long)]
    title: Option<String>,

    /// Accent color name.
    #[arg(long)]
    accent: Option<AccentColor>,

    /// Badge identifier; repeat to select several, in order.
    #[arg(long = "badge")]
    badges: Vec<String>,

    /// JSON profile with title, accent and badges. Flags override it.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Print the badge catalog and exit.
    #[arg(long)]
    list_badges: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "thumbnail export failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if args.list_badges {
        for badge in &BadgeCatalog::builtin() {
            println!("{}", badge.id());
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => ThumbnailConfig::load(path)?,
        None => ThumbnailConfig::default(),
    };
    let mut composer = Composer::new(&config)?;

    let mut profile = match &args.profile {
        Some(path) => ThumbnailProfile::from_json(&tokio::fs::read_to_string(path).await?)?,
        None => ThumbnailProfile::new(),
    };
    if let Some(title) = args.title {
        profile.title = title;
    }
    if let Some(accent) = args.accent {
        profile.accent = accent;
    }
    if !args.badges.is_empty() {
        profile.badges = args.badges;
    }
    composer.apply_profile(&profile)?;

    if let Some(path) = args.image {
        composer.upload_path(path).await?;
    }

    let path = composer.export(&DirectorySaver::new(args.out)).await?;
    println!("{}", path.display());
    Ok(())
}
