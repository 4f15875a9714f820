//! harspec CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use harspec_core::config::{expand_user_path, parse_domains, GenerateConfig};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "harspec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate an OpenAPI document from a HAR capture
    Generate {
        /// Path to the HAR capture file (supports ~ expansion)
        #[arg(long)]
        har_path: Option<String>,
        /// Comma separated domains that belong to the target service
        ///
        /// Example: --domains example.com,api.example.net
        #[arg(long)]
        domains: Option<String>,
        /// Output path (default: the input path with a .openapi.json extension)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Load run settings from a YAML config file; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Save the effective settings next to the output for repeat runs
        #[arg(long)]
        save_config: Option<PathBuf>,
        /// Overwrite the output file if it already exists
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            har_path,
            domains,
            output,
            config,
            save_config,
            force,
        } => {
            let config =
                resolve_config(har_path, domains, output, config).await?;

            let output_path = config.resolved_output_path();
            if output_path.exists() && !force {
                anyhow::bail!(
                    "output file {} already exists (pass --force to overwrite)",
                    output_path.display()
                );
            }

            // Ctrl-C flips the token; the generator checks it per entry and
            // never leaves a partial document behind.
            let cancel = CancellationToken::new();
            let signal_token = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, cancelling");
                    signal_token.cancel();
                }
            });

            let result = harspec_core::generate(&cancel, &config)
                .await
                .context("Failed to generate OpenAPI document")?;

            if let Some(save_path) = save_config {
                config
                    .save(&save_path)
                    .await
                    .context("Failed to save config")?;
            }

            println!();
            println!("HAR file  : {}", config.har_path.display());
            println!("Domains   : {}", config.domains.join(", "));
            println!("OpenAPI   : {}", result.output_path.display());
            println!("Path count: {}", result.document.paths.len());
        }
    }
    Ok(())
}

/// Merge the optional config file with command-line flags; flags win.
async fn resolve_config(
    har_path: Option<String>,
    domains: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> anyhow::Result<GenerateConfig> {
    let mut config = match config_path {
        Some(path) => GenerateConfig::from_file(&path)
            .await
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GenerateConfig::new(PathBuf::new(), Vec::new()),
    };

    if let Some(raw) = har_path {
        config.har_path = expand_user_path(&raw).context("Invalid HAR path")?;
    }
    if let Some(raw) = domains {
        config.domains = parse_domains(&raw);
    }
    if output.is_some() {
        config.output_path = output;
    }

    if config.har_path.as_os_str().is_empty() {
        anyhow::bail!("no HAR file given; pass --har-path or --config");
    }
    if config.domains.is_empty() {
        anyhow::bail!("no domains given; pass --domains or --config");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let config = resolve_config(
            Some("/tmp/capture.har".to_string()),
            Some("Example.com, example.com".to_string()),
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(config.har_path, PathBuf::from("/tmp/capture.har"));
        assert_eq!(config.domains, vec!["example.com"]);
        assert_eq!(
            config.resolved_output_path(),
            PathBuf::from("/tmp/capture.openapi.json")
        );
    }

    #[tokio::test]
    async fn test_missing_inputs_are_rejected() {
        assert!(resolve_config(None, None, None, None).await.is_err());
        assert!(
            resolve_config(Some("/tmp/c.har".to_string()), None, None, None)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_config_file_provides_defaults() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config_path = dir.path().join("run.yaml");
        let stored = GenerateConfig::new("/tmp/stored.har", vec!["stored.com".to_string()]);
        stored.save(&config_path).await?;

        let config = resolve_config(
            None,
            Some("flag.com".to_string()),
            None,
            Some(config_path),
        )
        .await?;

        assert_eq!(config.har_path, PathBuf::from("/tmp/stored.har"));
        // the flag overrides the stored domain list
        assert_eq!(config.domains, vec!["flag.com"]);
        Ok(())
    }
}
