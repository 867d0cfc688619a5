use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use st_core::rad_to_hz;
use st_layout::BlockLayout;
use st_response::{BlockLayoutWithData, LoopType, ResponseType, stability_margins};
use tracing::info;

mod config;
mod error;

use config::AnalysisConfig;
use error::{CliError, CliResult};

#[derive(Parser)]
#[command(name = "st-cli")]
#[command(about = "servotune CLI - Cascaded servo loop frequency-response analysis", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute responses and print them
    Analyze {
        /// Path to the analysis YAML file
        config_path: PathBuf,
        /// Responses to print (e.g. "Servo Open Loop"); defaults to one loop's family
        #[arg(short, long)]
        response: Vec<String>,
        /// Loop whose responses are printed when none are named
        #[arg(long, value_enum, default_value_t = LoopArg::Servo)]
        loop_type: LoopArg,
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },
    /// Print gain/phase margins of the servo and current open loops
    Margins {
        /// Path to the analysis YAML file
        config_path: PathBuf,
    },
    /// Print the block tree
    Tree {
        /// Path to the analysis YAML file
        config_path: PathBuf,
    },
    /// Print a default analysis YAML
    Init,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum LoopArg {
    Servo,
    Current,
}

impl From<LoopArg> for LoopType {
    fn from(arg: LoopArg) -> Self {
        match arg {
            LoopArg::Servo => LoopType::Servo,
            LoopArg::Current => LoopType::Current,
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            config_path,
            response,
            loop_type,
            format,
        } => cmd_analyze(&config_path, &response, loop_type.into(), format),
        Commands::Margins { config_path } => cmd_margins(&config_path),
        Commands::Tree { config_path } => cmd_tree(&config_path),
        Commands::Init => cmd_init(),
    }
}

fn load(config_path: &Path) -> CliResult<BlockLayoutWithData> {
    let text = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&text)?;
    let layout = BlockLayout::try_from_root(config.layout)?;
    let grid = config.grid.frequency_radians()?;
    info!(path = %config_path.display(), points = grid.len(), "analysis config loaded");

    let mut data = BlockLayoutWithData::new(layout, grid)?;
    data.filename = Some(config_path.to_path_buf());
    Ok(data)
}

fn select_responses(names: &[String], loop_type: LoopType) -> CliResult<Vec<ResponseType>> {
    if names.is_empty() {
        return Ok(loop_type.responses().collect());
    }
    names
        .iter()
        .map(|name| {
            ResponseType::from_name(name).ok_or_else(|| CliError::UnknownResponse(name.clone()))
        })
        .collect()
}

fn cmd_analyze(
    config_path: &Path,
    names: &[String],
    loop_type: LoopType,
    format: Format,
) -> CliResult<()> {
    let data = load(config_path)?;
    let selected = select_responses(names, loop_type)?;
    let available: Vec<_> = selected
        .iter()
        .filter_map(|&r| data.responses.shaped(r).map(|frd| (r, frd)))
        .collect();

    let text = match format {
        Format::Json => {
            let mut map = serde_json::Map::new();
            for (r, frd) in &available {
                map.insert(r.label().to_string(), serde_json::to_value(frd)?);
            }
            serde_json::to_string_pretty(&map)?
        }
        Format::Csv => {
            let mut csv = String::from("frequency_hz");
            for (r, _) in &available {
                let key = r.label().to_lowercase().replace(' ', "_");
                csv.push_str(&format!(",{key}_db,{key}_deg"));
            }
            csv.push('\n');
            let columns: Vec<_> = available
                .iter()
                .map(|(_, frd)| (frd.magnitude_db(), frd.phase_deg()))
                .collect();
            for (i, &w) in data.frequency_radians().iter().enumerate() {
                csv.push_str(&format!("{}", rad_to_hz(w)));
                for (mag, phase) in &columns {
                    csv.push_str(&format!(",{},{}", mag[i], phase[i]));
                }
                csv.push('\n');
            }
            csv
        }
    };

    io::stdout().write_all(text.as_bytes())?;
    Ok(())
}

fn cmd_margins(config_path: &Path) -> CliResult<()> {
    let data = load(config_path)?;

    for (label, response) in [
        ("Servo loop", ResponseType::ServoOpenLoop),
        ("Current loop", ResponseType::CurrentOpenLoop),
    ] {
        println!("{label}:");
        let Some(open_loop) = data.responses.shaped(response) else {
            println!("  (not computed)");
            continue;
        };
        let margins = stability_margins(open_loop);
        match margins.gain {
            Some(gm) => println!(
                "  Gain margin:  {:.2} dB at {:.1} Hz",
                gm.db,
                rad_to_hz(gm.frequency)
            ),
            None => println!("  Gain margin:  none"),
        }
        match margins.phase {
            Some(pm) => println!(
                "  Phase margin: {:.1} deg at {:.1} Hz",
                pm.degrees,
                rad_to_hz(pm.frequency)
            ),
            None => println!("  Phase margin: none"),
        }
        if let Some(ms) = margins.peak_sensitivity {
            println!(
                "  Peak |S|:     {:.2} dB at {:.1} Hz",
                ms.db,
                rad_to_hz(ms.frequency)
            );
        }
    }
    Ok(())
}

fn cmd_tree(config_path: &Path) -> CliResult<()> {
    let text = std::fs::read_to_string(config_path)?;
    let config = AnalysisConfig::from_yaml(&text)?;
    let layout = BlockLayout::try_from_root(config.layout)?;
    print!("{}", layout.tree());
    Ok(())
}

fn cmd_init() -> CliResult<()> {
    let yaml = serde_yaml::to_string(&AnalysisConfig::default())?;
    print!("{yaml}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_is_the_loop_family() {
        let servo = select_responses(&[], LoopType::Servo).unwrap();
        assert!(servo.contains(&ResponseType::ServoOpenLoop));
        assert!(servo.iter().all(|r| r.loop_type() == LoopType::Servo));
    }

    #[test]
    fn named_selection_rejects_unknown() {
        let ok = select_responses(&["servo_open_loop".into()], LoopType::Servo).unwrap();
        assert_eq!(ok, vec![ResponseType::ServoOpenLoop]);
        let err = select_responses(&["Bogus".into()], LoopType::Servo).unwrap_err();
        assert!(err.to_string().contains("Bogus"));
    }

    #[test]
    fn analyze_prints_to_stdout_only() {
        let cli = Cli::try_parse_from(["st-cli", "analyze", "stage.yaml", "-f", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Analyze {
                format: Format::Json,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["st-cli", "analyze", "stage.yaml", "--output", "out.csv"]).is_err());
    }
}
