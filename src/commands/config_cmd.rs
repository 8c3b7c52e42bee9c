use clap::{Args, Subcommand, ValueEnum};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => print!("{}", render_text(config)),
                }
                Ok(())
            }
        }
    }
}

fn render_text(config: &Config) -> String {
    let mut out = String::new();
    let mut line = |s: String| {
        out.push_str(&s);
        out.push('\n');
    };

    line("Configuration".to_string());
    line("=============\n".to_string());

    match &config.config_file {
        Some(path) => line(format!("Config file: {}", path.display())),
        None => line(format!(
            "Config file: {} (not found)",
            Config::default_config_path().display()
        )),
    }
    line(String::new());

    line(format!("input_path: {}", config.input_path.value.display()));
    line(format!("  source: {}", config.input_path.source));
    line(format!("delimiter: {:?}", config.delimiter));
    line(String::new());

    let firestore = &config.firestore;
    line(format!(
        "firestore.project_id: {}",
        firestore.project_id.as_deref().unwrap_or("(not set)")
    ));
    line(format!("firestore.database: {}", firestore.database));
    line(format!("firestore.collection: {}", firestore.collection));
    if let Some(host) = &firestore.emulator_host {
        line(format!("firestore.emulator_host: {}", host));
    }
    let credentials = if firestore.credentials.access_token.is_some() {
        "access token".to_string()
    } else if let Some(path) = &firestore.credentials.access_token_file {
        format!("token file {}", path.display())
    } else {
        "(not set)".to_string()
    };
    line(format!("firestore.credentials: {}", credentials));
    line(String::new());

    line(format!(
        "storage.bucket: {}",
        config.storage.bucket.as_deref().unwrap_or("(not set)")
    ));
    line(format!("storage.folder: {}", config.storage.folder));
    line(format!(
        "storage.token: {}",
        if config.storage.token.is_some() {
            "(set)"
        } else {
            "(not set)"
        }
    ));
    line(String::new());

    line(format!("mapping.key_column: {}", config.mapping.key_column));
    for column in &config.mapping.columns {
        line(format!("  {} -> {}", column.source, column.target));
    }
    for derived in &config.mapping.derived {
        line(format!("  {} <- {:?}", derived.field, derived.rule));
    }

    out
}
