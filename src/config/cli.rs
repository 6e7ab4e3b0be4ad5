use crate::config::ClientConfig;
use crate::core::client::DEFAULT_BASE_URL;
use crate::core::mapper::ErrorPolicy;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "chefs-etl")]
#[command(about = "Fetch CHEFS form data and remap record fields")]
pub struct Cli {
    #[arg(long, env = "CHEFS_FORM_ID", default_value = "", global = true)]
    pub form_id: String,

    #[arg(long, env = "CHEFS_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub api_key: String,

    #[arg(long, env = "CHEFS_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Enable verbose output", global = true)]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON", global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show form details
    Form,
    /// Show the id of the form's latest version
    LatestVersion,
    /// Check whether a version id belongs to the form
    VersionExists { version: String },
    /// List field names of a form version
    Fields {
        #[arg(long)]
        version: Option<String>,
    },
    /// List submissions
    Submissions {
        #[arg(long)]
        version: Option<String>,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Discover submission data of a version
    Discover {
        #[arg(long)]
        version: Option<String>,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Show a single submission
    Submission { submission_id: String },
    /// Show a single file
    File { file_id: String },
    /// Remap fields of a {"data": [...]} document
    Transform {
        /// Input document, `-` for stdin
        #[arg(long, default_value = "-")]
        input: String,
        /// Mapping file (.toml or .json)
        #[arg(long)]
        mapping: String,
        #[arg(long, value_enum)]
        on_error: Option<OnError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    Abort,
    SkipRecord,
    CollectErrors,
}

impl From<OnError> for ErrorPolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => ErrorPolicy::Abort,
            OnError::SkipRecord => ErrorPolicy::SkipRecord,
            OnError::CollectErrors => ErrorPolicy::CollectErrors,
        }
    }
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            form_id: self.form_id.clone(),
            api_key: self.api_key.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_submissions_command() {
        let cli = Cli::try_parse_from([
            "chefs-etl",
            "--form-id",
            "f1",
            "--api-key",
            "secret",
            "submissions",
            "--version",
            "7",
            "--fields",
            "a,b",
        ])
        .unwrap();

        assert_eq!(cli.form_id, "f1");
        match cli.command {
            Command::Submissions { version, fields } => {
                assert_eq!(version.as_deref(), Some("7"));
                assert_eq!(fields, vec!["a", "b"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_transform_command() {
        let cli = Cli::try_parse_from([
            "chefs-etl",
            "transform",
            "--mapping",
            "mapping.toml",
            "--on-error",
            "collect-errors",
        ])
        .unwrap();

        match cli.command {
            Command::Transform {
                input,
                mapping,
                on_error,
            } => {
                assert_eq!(input, "-");
                assert_eq!(mapping, "mapping.toml");
                assert_eq!(on_error.map(ErrorPolicy::from), Some(ErrorPolicy::CollectErrors));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
