use chefs_etl::config::cli::{Cli, Command};
use chefs_etl::utils::error::ErrorSeverity;
use chefs_etl::utils::{logger, validation::Validate};
use chefs_etl::{process, EtlError, MappingConfig, ProcessReport, Result};
use clap::Parser;
use std::io::Read;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_logger(logger::LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::info!("Starting chefs-etl CLI");
    if cli.verbose {
        tracing::debug!("Command: {:?}", cli.command);
    }

    match run(&cli).await {
        Ok(report) => {
            println!("{}", report.output);

            // collect-errors：輸出照印，但以非零結束碼通知呼叫端
            if !report.errors.is_empty() {
                for e in &report.errors {
                    tracing::error!("❌ {}", e);
                }
                eprintln!(
                    "⚠️ {} record(s) failed to transform, see \"errors\" in the output",
                    report.errors.len()
                );
                std::process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!("❌ chefs-etl failed: {} (Severity: {:?})", e, e.severity());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

async fn run(cli: &Cli) -> Result<ProcessReport> {
    if let Command::Transform {
        input,
        mapping,
        on_error,
    } = &cli.command
    {
        let config = MappingConfig::from_file(mapping)?;
        config.validate()?;
        let mut mapper = config.into_mapper();
        if let Some(policy) = on_error {
            mapper = mapper.with_policy((*policy).into());
        }

        let text = read_input(input)?;
        return process(&text, &mapper);
    }

    let config = cli.client_config();
    config.validate()?;
    let client = config.build_client();
    let form_id = config.form_id.as_str();

    let body = match &cli.command {
        Command::Form => client.get_form_details(form_id).await?,
        Command::LatestVersion => {
            serde_json::Value::String(client.get_latest_version_id(form_id).await?)
        }
        Command::VersionExists { version } => {
            serde_json::Value::Bool(client.version_exists(form_id, version).await?)
        }
        Command::Fields { version } => {
            serde_json::Value::from(client.get_version_fields(form_id, version.as_deref()).await?)
        }
        Command::Submissions { version, fields } => {
            client
                .list_submissions(form_id, version.as_deref(), fields)
                .await?
        }
        Command::Discover { version, fields } => {
            client
                .get_submission_data(form_id, version.as_deref(), fields)
                .await?
        }
        Command::Submission { submission_id } => client.get_submission(submission_id).await?,
        Command::File { file_id } => client.get_file(file_id).await?,
        Command::Transform { .. } => {
            return Err(EtlError::ConfigError {
                message: "transform does not call the API".to_string(),
            })
        }
    };

    Ok(ProcessReport {
        output: serde_json::to_string_pretty(&body)?,
        errors: Vec::new(),
    })
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(input)?)
    }
}
