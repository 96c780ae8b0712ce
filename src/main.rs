use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use recordsynth::export::sink::{DirectorySink, ZipArchiveWriter};
use recordsynth::export::CancelToken;
use recordsynth::rendering::SurfaceRasterizer;
use recordsynth::rng::SeededRng;
use recordsynth::{ExportMode, ExportOrchestrator, RecordGenerator, Session, Settings, Track};

#[derive(Parser)]
#[command(name = "recordsynth", version, about = "Synthetic student record generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate one record and print it as JSON
    Generate(GenerateArgs),
    /// Generate one record and export its documents
    Export(ExportArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
    /// Track (major) to generate for, e.g. "Computer Science"
    #[arg(long)]
    track: Option<Track>,
    /// Anchor date for date draws (defaults to the local date)
    #[arg(long)]
    today: Option<NaiveDate>,
    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    generate: GenerateArgs,
    /// grid, row, or archive
    #[arg(long, default_value = "grid")]
    mode: ExportMode,
    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

impl GenerateArgs {
    fn settings(&self) -> anyhow::Result<Settings> {
        match &self.config {
            Some(path) => Settings::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display())),
            None => Ok(Settings::default()),
        }
    }

    fn rng(&self) -> SeededRng {
        self.seed.map(SeededRng::from_seed).unwrap_or_else(SeededRng::from_entropy)
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => {
            let settings = args.settings()?;
            let generator = RecordGenerator::new(settings.generator)?;
            let mut rng = args.rng();
            let record = match args.track {
                Some(track) => generator.generate_for_track(track, &mut rng, args.today())?,
                None => generator.generate(&mut rng, args.today())?,
            };
            println!("{}", record.to_json()?);
        }
        Command::Export(args) => {
            let settings = args.generate.settings()?;
            let generator = RecordGenerator::new(settings.generator)?;
            let orchestrator = ExportOrchestrator::new(
                Arc::new(SurfaceRasterizer::new()),
                Arc::new(ZipArchiveWriter),
                Arc::new(DirectorySink::new(&args.out)),
                settings.export,
            );
            let mut session = Session::new(generator, orchestrator);
            session.set_mode(args.mode);

            let mut rng = args.generate.rng();
            let record = session.regenerate(args.generate.track, &mut rng, args.generate.today())?;
            eprintln!("generated record for {} ({})", record.identity.full_name(), record.major);

            let cancel = CancelToken::new();
            let ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    ctrl_c.cancel();
                }
            });

            match session.export(&cancel).await {
                Ok(report) => {
                    println!("{}", report.saved.location);
                    for entry in &report.entries {
                        eprintln!("  {}", entry);
                    }
                }
                Err(err) => {
                    let notice = session.last_failure().unwrap_or_else(|| err.to_string());
                    anyhow::bail!(notice);
                }
            }
        }
    }
    Ok(())
}
