//! undocx CLI - DOCX to e-book tagged markup

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use log::debug;

use undocx::{DocxParser, TagConfig};

#[derive(Parser)]
#[command(name = "undocx")]
#[command(version)]
#[command(about = "Convert DOCX files to e-book tagged markup", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Tag configuration JSON file (builtin vocabulary if omitted)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a DOCX to both artifacts (tagged text and JSON wrapper)
    Convert {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Tag configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Convert a DOCX to tagged text
    Text {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Tag configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Convert a DOCX to the {"html": ...} JSON wrapper
    Json {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Tag configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Show document information
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Tag configuration JSON file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            config,
        }) => cmd_convert(&input, output.as_deref(), config.or(cli.config).as_deref()),
        Some(Commands::Text {
            input,
            output,
            config,
        }) => cmd_text(&input, output.as_deref(), config.or(cli.config).as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
            config,
        }) => cmd_json(
            &input,
            output.as_deref(),
            compact,
            config.or(cli.config).as_deref(),
        ),
        Some(Commands::Info { input, config }) => cmd_info(&input, config.or(cli.config).as_deref()),
        None => match cli.input {
            Some(input) => cmd_convert(&input, cli.output.as_deref(), cli.config.as_deref()),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

fn load_config(path: Option<&Path>) -> Result<TagConfig, Box<dyn Error>> {
    match path {
        Some(path) => {
            debug!("loading tag configuration from {}", path.display());
            let json = fs::read_to_string(path)?;
            Ok(TagConfig::from_json(&json)?)
        }
        None => Ok(TagConfig::builtin()),
    }
}

/// Refuse oversized inputs before parsing; the limit comes from the
/// configuration document and is enforced here, not in the engine.
fn check_size(input: &Path, config: &TagConfig) -> Result<(), Box<dyn Error>> {
    let size = fs::metadata(input)?.len();
    let limit = u64::from(config.max_file_size_mb) * 1024 * 1024;
    if size > limit {
        return Err(format!(
            "{} is {:.1} MB, over the configured {} MB limit",
            input.display(),
            size as f64 / (1024.0 * 1024.0),
            config.max_file_size_mb
        )
        .into());
    }
    Ok(())
}

fn convert(input: &Path, config: &TagConfig) -> Result<String, Box<dyn Error>> {
    check_size(input, config)?;
    Ok(undocx::convert_file(input, config)?)
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let config = load_config(config)?;
    let text = convert(input, &config)?;

    let dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or(Path::new(".")).to_path_buf(),
    };
    fs::create_dir_all(&dir)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let txt_path = dir.join(format!("{stem}.txt"));
    fs::write(&txt_path, &text)?;
    println!("{} {}", "✓".green(), txt_path.display());

    let json_path = dir.join(format!("{stem}.json"));
    let wrapper = serde_json::json!({ "html": text });
    fs::write(&json_path, serde_json::to_string_pretty(&wrapper)?)?;
    println!("{} {}", "✓".green(), json_path.display());

    Ok(())
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let config = load_config(config)?;
    let text = convert(input, &config)?;
    write_or_print(output, &text)
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    config: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let config = load_config(config)?;
    let text = convert(input, &config)?;
    let wrapper = serde_json::json!({ "html": text });
    let json = if compact {
        serde_json::to_string(&wrapper)?
    } else {
        serde_json::to_string_pretty(&wrapper)?
    };
    write_or_print(output, &json)
}

fn cmd_info(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let config = load_config(config)?;
    check_size(input, &config)?;

    let mut parser = DocxParser::open(input)?;
    let media = parser.extract_media()?;
    let doc = parser.parse()?;

    println!("{}", input.display().to_string().bold());
    println!("  paragraphs: {}", doc.paragraph_count());
    println!("  runs:       {}", doc.run_count());
    println!("  media:      {}", media.len());
    println!("  tag rules:  {}", config.tags.len());
    Ok(())
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn Error>> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} {}", "✓".green(), path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}
