//! nmr-notation: parse, check and typeset NMR peak lists from the command line.
//!
//! Input is read from a file path or `-` for stdin. Peak data is exchanged as
//! the same JSON the library serializes (`chemicalShift`, `jValues`, ...).

use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use nmr_notation::notation::format::{format_with, to_plain_text, FormatSettings};
use nmr_notation::notation::validate::ValidationError;
use nmr_notation::{
    is_j_values_optional, multiplet_numbers, parse_nmr_text, validate, NmrData,
};

#[derive(Parser)]
#[command(
    name = "nmr-notation",
    version,
    about = "Parse, validate and typeset NMR peak lists"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a spectrum description into JSON peak data
    Parse {
        /// Text file (or - for stdin)
        #[arg(default_value = "-")]
        input: String,
    },

    /// Render JSON peak data as journal text
    Format {
        /// JSON file (or - for stdin)
        #[arg(default_value = "-")]
        input: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List validation findings for JSON peak data (exit code 1 if any)
    Validate {
        /// JSON file (or - for stdin)
        #[arg(default_value = "-")]
        input: String,
    },

    /// Show how a multiplicity string is read
    Multiplicity {
        /// Shorthand such as "dd", "br s" or "m(tt)"
        text: String,
    },

    /// Parse a spectrum description, tidy it and render it again
    Convert {
        /// Text file (or - for stdin)
        #[arg(default_value = "-")]
        input: String,

        /// Keep peaks in their original order
        #[arg(long, default_value_t = false)]
        no_sort: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// JSON file with format settings
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Significant figures for chemical shifts
    #[arg(long)]
    shift_sig_figs: Option<u32>,

    /// Significant figures for J-values
    #[arg(long)]
    j_sig_figs: Option<u32>,

    /// Decimal places for integrations
    #[arg(long)]
    integration_decimals: Option<u32>,

    /// Emit plain text instead of HTML
    #[arg(long, default_value_t = false)]
    plain: bool,
}

impl OutputArgs {
    /// Settings file first, then individual flags on top.
    fn format_settings(&self) -> Result<FormatSettings, Box<dyn Error>> {
        let mut settings = match &self.settings {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                log::info!("Loaded format settings from {}", path.display());
                serde_json::from_str(&json)?
            }
            None => FormatSettings::default(),
        };

        if let Some(v) = self.shift_sig_figs {
            settings.shift_sig_figs = v;
        }
        if let Some(v) = self.j_sig_figs {
            settings.j_sig_figs = v;
        }
        if let Some(v) = self.integration_decimals {
            settings.integration_decimals = v;
        }
        Ok(settings)
    }

    fn render(&self, data: &NmrData) -> Result<String, Box<dyn Error>> {
        let html = format_with(data, &self.format_settings()?);
        Ok(if self.plain { to_plain_text(&html) } else { html })
    }
}

fn read_input(input: &str) -> io::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        io::stdin().lock().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input)
    }
}

fn read_data(input: &str) -> Result<NmrData, Box<dyn Error>> {
    let json = read_input(input)?;
    Ok(serde_json::from_str(&json)?)
}

fn report(findings: &[ValidationError]) {
    for finding in findings {
        log::warn!("{}", finding);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Parse { input } => {
            let data = parse_nmr_text(&read_input(&input)?);
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Command::Format { input, output } => {
            let data = read_data(&input)?;
            println!("{}", output.render(&data)?);
        }
        Command::Validate { input } => {
            let data = read_data(&input)?;
            let findings = validate(&data);
            if findings.is_empty() {
                println!("No problems found in {} peaks.", data.peaks.len());
            } else {
                for finding in &findings {
                    println!("{}", finding);
                }
                std::process::exit(1);
            }
        }
        Command::Multiplicity { text } => {
            let numbers = multiplet_numbers(&text)?;
            match &numbers {
                Some(n) => println!("splittings: {:?}", n),
                None => println!("splittings: none"),
            }
            println!("J-values:   {}", numbers.as_ref().map_or(0, |n| n.len()));
            println!("optional:   {}", is_j_values_optional(&text));
        }
        Command::Convert {
            input,
            no_sort,
            output,
        } => {
            let mut data = parse_nmr_text(&read_input(&input)?);
            data.correct_j_values();
            if !no_sort {
                data.sort_peaks();
            }
            report(&validate(&data));
            println!("{}", output.render(&data)?);
        }
    }

    Ok(())
}
