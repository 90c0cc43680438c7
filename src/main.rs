mod analyzer;
mod error;
mod loader;
mod models;
mod narrative;
mod report;
mod session;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use models::Config;
use narrative::{NarrativeRequester, OpenAiClient};
use session::{Response, Session, UserAction};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    dotenv::dotenv().ok();

    let matches = Command::new("university-dss")
        .version("0.1")
        .about("Analyzes university department data and suggests staffing and budget actions")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("CSV")
                .help("Department CSV with Department, Students, Faculty and Budget columns"),
        )
        .arg(
            Arg::new("sample")
                .long("sample")
                .help("Use the bundled sample data")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ai-insights")
                .long("ai-insights")
                .help("Ask the language model for strategic insights")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory for report files"),
        )
        .get_matches();

    let config_file = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("config.toml");

    // Load or create configuration
    let config = if Path::new(config_file).exists() {
        info!("loading configuration from {}", config_file);
        Config::load_from_file(config_file)
            .with_context(|| format!("Failed to load configuration: {}", config_file))?
    } else {
        info!("creating default configuration file {}", config_file);
        let default_config = Config::default();
        default_config.save_to_file(config_file)?;
        default_config
    };

    let data_file = matches
        .get_one::<String>("file")
        .cloned()
        .or_else(|| config.data_file.clone());
    let output_dir = PathBuf::from(
        matches
            .get_one::<String>("output")
            .cloned()
            .or_else(|| config.output_directory.clone())
            .unwrap_or_else(|| "output".to_string()),
    );

    let requester = NarrativeRequester::new(OpenAiClient::from_env(&config.narrative));
    let mut session = Session::new(requester, config.sample_data_file.as_ref().map(PathBuf::from));

    let action = match data_file {
        Some(path) if !matches.get_flag("sample") => {
            let bytes = fs::read(&path).with_context(|| format!("Failed to read file: {}", path))?;
            UserAction::Upload { name: path, bytes }
        }
        _ if matches.get_flag("sample") => UserAction::UseSampleData,
        _ => {
            println!("{}", session::UPLOAD_HINT);
            println!("   Run with --file <CSV> or --sample.");
            return Ok(());
        }
    };

    match session.handle(action).await {
        Response::Dashboard(view) => {
            report::print_dashboard(&view);
            report::write_reports(&view, &output_dir)?;
            println!("\n📂 Reports written to: {}", output_dir.display());
        }
        Response::Error(message) => {
            println!("❌ {}", message);
            return Ok(());
        }
        Response::Info(message) | Response::Insights(message) => println!("{}", message),
    }

    if matches.get_flag("ai-insights") {
        println!("\n🤖 Getting AI insights...");
        if let Response::Insights(text) = session.handle(UserAction::RequestInsights).await {
            println!("{}", text);
            report::write_insights(&text, &output_dir)?;
        }
    }

    Ok(())
}
