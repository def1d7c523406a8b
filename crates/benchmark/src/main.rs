//! Scenario Runner CLI

use clap::{Parser, Subcommand, ValueEnum};
use solarpack::{AlignmentPolicy, StructureKind};
use solarpack_scenarios::{RunnerConfig, Scenario, ScenarioParser, ScenarioRunner};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scenario-runner")]
#[command(about = "Scenario runner for the solarpack packing engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a scenario file
    Run {
        /// Path to the JSON scenario file
        file: PathBuf,

        /// Alignment policies to plan with
        #[arg(short, long, value_enum, default_values_t = vec![AlignmentArg::Center])]
        alignments: Vec<AlignmentArg>,

        /// Number of runs per alignment
        #[arg(short, long, default_value = "1")]
        runs: usize,

        /// Output file for results (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List structure presets
    ListPresets,

    /// Print or save a sample scenario
    Sample {
        /// Structure preset id
        #[arg(short, long, default_value = "ballasted")]
        structure: String,

        /// Output file (prints to stdout when absent)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AlignmentArg {
    /// Start at the left edge
    Left,
    /// Start at the right edge
    Right,
    /// Start at the back edge, centred
    Center,
    /// Start at the centroid with tightened pitches
    Justify,
    /// Best of the other four
    Optimum,
    /// Every policy
    All,
}

impl From<AlignmentArg> for Vec<AlignmentPolicy> {
    fn from(arg: AlignmentArg) -> Self {
        match arg {
            AlignmentArg::Left => vec![AlignmentPolicy::Left],
            AlignmentArg::Right => vec![AlignmentPolicy::Right],
            AlignmentArg::Center => vec![AlignmentPolicy::Center],
            AlignmentArg::Justify => vec![AlignmentPolicy::Justify],
            AlignmentArg::Optimum => vec![AlignmentPolicy::Optimum],
            AlignmentArg::All => RunnerConfig::all_alignments().alignments,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            alignments,
            runs,
            output,
        } => {
            let scenario = ScenarioParser::new().parse_file(&file)?;

            let mut policies: Vec<AlignmentPolicy> = Vec::new();
            for arg in alignments {
                for policy in Vec::<AlignmentPolicy>::from(arg) {
                    if !policies.contains(&policy) {
                        policies.push(policy);
                    }
                }
            }

            let config = RunnerConfig::new()
                .with_alignments(policies)
                .with_runs_per_config(runs);
            let report = ScenarioRunner::new(config).run_scenario(&scenario)?;

            report.print_summary();

            if let Some(path) = output {
                report.save_json(&path)?;
                println!("Results saved to: {}", path.display());
            }

            if !report.matches_expectation() {
                anyhow::bail!("scenario '{}' did not match its expected count", scenario.name);
            }
        }

        Commands::ListPresets => {
            println!("Available structure presets:");
            println!("============================");
            for kind in StructureKind::ALL {
                let preset = kind.preset();
                println!(
                    "  {:<22} {:<26} tilt {:>4.1}°  {:?}  GCR {:.2}  alignments {:?}",
                    kind.id(),
                    kind.name(),
                    preset.tilt_angle,
                    preset.orientation,
                    kind.ground_coverage_ratio(),
                    kind.allowed_alignments()
                );
            }
            println!("\nUse 'scenario-runner sample -s <PRESET>' to create a scenario");
        }

        Commands::Sample { structure, output } => {
            let kind = StructureKind::from_id(&structure)
                .ok_or_else(|| anyhow::anyhow!("unknown structure '{}'", structure))?;
            let json = serde_json::to_string_pretty(&Scenario::sample(kind))?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    println!("Scenario saved to: {}", path.display());
                }
                None => println!("{}", json),
            }
        }
    }

    Ok(())
}
