use std::path::PathBuf;

use clap::{Parser, Subcommand};
use core_bta::{
    Crew, analyze_report, file_hash, get_llm_config, llms::OpenAiProvider, normalize_query, read_blood_test_report,
    setup_logging,
};

#[derive(Parser)]
#[command(name = "core-bta")]
#[command(about = "The Core Blood Test Report Toolkit", long_about = None)]
struct CoreCli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and print the cleaned text of a blood test report PDF
    Read {
        #[arg(short, long, value_parser = validate_input_file)]
        file: PathBuf,
    },

    /// Print the MD5 hash used to cache analyses of a report
    Hash {
        #[arg(short, long, value_parser = validate_input_file)]
        file: PathBuf,
    },

    /// Run the medical crew on a report using the configured LLM
    Analyze {
        #[arg(short, long, value_parser = validate_input_file)]
        file: PathBuf,
        /// What to ask about the report. Defaults to a comprehensive analysis.
        #[arg(short, long)]
        query: Option<String>,
        /// Write the analysis here instead of printing it
        #[arg(short, long, value_parser = validate_output_file)]
        output: Option<PathBuf>,
    },
}

fn validate_input_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if !path.exists() {
        return Err(format!("Input path does not exist: {}", path.display()));
    }

    if !path.is_file() {
        return Err(format!("Input path is not a file: {}", path.display()));
    }

    let metadata = std::fs::metadata(&path).map_err(|e| format!("Cannot read input file metadata: {}", e))?;

    if metadata.len() == 0 {
        return Err(format!("Input file is empty: {}", path.display()));
    }

    Ok(path)
}

fn validate_output_file(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);

    if path.exists() && path.is_dir() {
        return Err(format!("Output path is a directory: {}", path.display()));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        return Err(format!(
            "Output file parent directory does not exist: {}",
            parent.display()
        ));
    }

    Ok(path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = CoreCli::parse();

    match cli.command {
        Commands::Read { file } => {
            let text = read_blood_test_report(&file)?;
            println!("{text}");
        }

        Commands::Hash { file } => {
            let bytes = std::fs::read(&file)?;
            println!("{}", file_hash(&bytes));
        }

        Commands::Analyze { file, query, output } => {
            setup_logging("core_bta=info")?;

            let config = get_llm_config();
            tracing::info!("Analyzing {:?} with model '{}' at {}", file, config.model, config.api_base);
            let provider = OpenAiProvider::new(&config);
            let query = normalize_query(query.as_deref());

            let outcome = analyze_report(&provider, &Crew::medical(), &file, &query).await?;
            tracing::info!("Analysis finished in {}s", outcome.processing_time_secs);

            match output {
                Some(path) => {
                    std::fs::write(&path, &outcome.analysis)?;
                    println!("Wrote analysis to {path:?}");
                }
                None => println!("{}", outcome.analysis),
            }
        }
    }
    Ok(())
}
