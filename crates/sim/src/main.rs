//! U-ASRS simulation CLI

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use u_asrs::AsrsManager;
use u_asrs_sim::{
    generate_arrivals, load_arrivals, load_config, save_arrivals, GeneratorConfig, RotationMode,
    SimulationRunner,
};

#[derive(Parser)]
#[command(name = "asrs-sim")]
#[command(about = "Replays arrival feeds through the U-ASRS storage manager")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a random arrival feed
    Generate {
        /// Number of arrivals
        #[arg(short, long, default_value = "200")]
        count: usize,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Rotation flag policy
        #[arg(short, long, value_enum, default_value = "random")]
        rotation: RotationArg,

        /// Output file (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Place a feed online, then reorganize
    Run {
        /// Manager configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,

        /// Arrival feed (JSON)
        #[arg(short, long)]
        items: PathBuf,

        /// Skip the offline reorganization
        #[arg(long)]
        no_reorganize: bool,

        /// Output file for the report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RotationArg {
    /// Every item may rotate
    Always,
    /// No item may rotate
    Never,
    /// Random per item
    Random,
}

impl From<RotationArg> for RotationMode {
    fn from(arg: RotationArg) -> Self {
        match arg {
            RotationArg::Always => RotationMode::Always,
            RotationArg::Never => RotationMode::Never,
            RotationArg::Random => RotationMode::Random,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            count,
            seed,
            rotation,
            output,
        } => {
            let config = GeneratorConfig::default()
                .with_count(count)
                .with_rotation(rotation.into());
            let records = generate_arrivals(&config, seed)?;
            save_arrivals(&records, &output)?;
            println!("Generated {} arrivals to: {}", records.len(), output.display());
        }

        Commands::Run {
            config,
            items,
            no_reorganize,
            output,
        } => {
            let config = load_config(&config)?;
            let arrivals = load_arrivals(&items)?;
            let mut manager = AsrsManager::from_config(config)?;

            let report = SimulationRunner::new()
                .with_reorganize(!no_reorganize)
                .run(&mut manager, &arrivals);

            report.print_summary();

            println!("\nBins:");
            for (id, bin) in manager.bins() {
                let cargo: Vec<String> = bin
                    .pallets()
                    .filter_map(|p| p.pallet().item().map(|item| item.id().clone()))
                    .collect();
                println!(
                    "  bin {:<4} {:>5.1}% {:?}",
                    id,
                    bin.utilization() * 100.0,
                    cargo
                );
            }

            if let Some(path) = output {
                report.save_json(&path)?;
                println!("Report saved to: {}", path.display());
            }
        }
    }

    Ok(())
}
