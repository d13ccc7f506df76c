//! Command-line interface for all Lamina operations.
//!
//! Each command is an independent, one-shot invocation: read settings,
//! talk to the provider and/or the layer registry, print the outcome.
//! The provider seams are async (the SDK is async); the CLI blocks on a
//! private runtime so every call remains one sequential round trip.

use crate::backend::HttpLayerRegistry;
use crate::config::Settings;
use crate::error::ApiError;
use crate::inventory::{FunctionRow, InventoryFilter, InventoryReader};
use crate::logging::LoggingConfig;
use crate::provider::{self, AwsFunctionApi, AwsStackApi};
use crate::reconcile::{InstallOutcome, Reconciler};
use crate::template::TemplateRewriter;
use crate::tooling::pager::{terminal_rows, InventoryPager};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lamina CLI - manage the observability layer on serverless functions
#[derive(Parser)]
#[command(name = "lamina")]
#[command(about = "Install and manage the Lamina observability layer on AWS Lambda functions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, file, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold the logging flags over the configured defaults.
    pub fn apply_logging_overrides(&self, config: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage live functions
    Lambda {
        #[command(subcommand)]
        command: LambdaCommands,
    },
    /// Rewrite CloudFormation templates and stacks
    Stack {
        #[command(subcommand)]
        command: StackCommands,
    },
}

#[derive(Subcommand)]
pub enum LambdaCommands {
    /// List functions with their install state
    List {
        /// Skip the header row
        #[arg(long, short)]
        quiet: bool,
        /// Filter rows (all, installed, not-installed)
        #[arg(long, short)]
        filter: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Attach the agent layer to a function
    Install {
        /// Lambda function name
        #[arg(long, short)]
        function: String,
        /// Layer ARN for the agent library (default: auto-detect)
        #[arg(long, short)]
        layer_arn: Option<String>,
        /// Lamina token (default: LAMINA_TOKEN)
        #[arg(long, short)]
        token: Option<String>,
    },
    /// Remove the agent layer and restore the original handler
    Uninstall {
        /// Lambda function name
        #[arg(long, short)]
        function: String,
        /// Layer ARN for the agent library (default: auto-detect)
        #[arg(long, short)]
        layer_arn: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum StackCommands {
    /// Rewrite a local CloudFormation JSON file
    Template {
        /// CloudFormation JSON file
        #[arg(long, short, default_value = "template.json")]
        input: PathBuf,
        /// Lambda function name
        #[arg(long, short)]
        function: String,
        /// Output file for the modified template ("-" for stdout)
        #[arg(long, short, default_value = "-")]
        output: String,
        /// Lamina token (default: LAMINA_TOKEN)
        #[arg(long, short)]
        token: Option<String>,
    },
    /// Rewrite a deployed stack's template
    Update {
        /// CloudFormation stack name or id
        #[arg(long, short)]
        stack_id: String,
        /// Lambda function name
        #[arg(long, short)]
        function: String,
        /// Lamina token (default: LAMINA_TOKEN)
        #[arg(long, short)]
        token: Option<String>,
    },
}

/// CLI context carrying settings and the blocking runtime.
pub struct CliContext {
    settings: Settings,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    pub fn new(settings: Settings) -> Result<Self, ApiError> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;
        Ok(Self { settings, runtime })
    }

    /// Execute a CLI command, returning the text to print on success.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Lambda { command } => self.handle_lambda_command(command),
            Commands::Stack { command } => {
                if !self.settings.cloudformation_enabled() {
                    return Err(ApiError::ConfigError(
                        "The stack command group is disabled. Set LAMINA_FF_CLOUDFORMATION=1 to enable it."
                            .to_string(),
                    ));
                }
                self.handle_stack_command(command)
            }
        }
    }

    fn handle_lambda_command(&self, command: &LambdaCommands) -> Result<String, ApiError> {
        match command {
            LambdaCommands::List {
                quiet,
                filter,
                format,
            } => self.handle_list(*quiet, filter.as_deref(), format),
            LambdaCommands::Install {
                function,
                layer_arn,
                token,
            } => self.handle_install(function, layer_arn.as_deref(), token.as_deref()),
            LambdaCommands::Uninstall {
                function,
                layer_arn,
            } => self.handle_uninstall(function, layer_arn.as_deref()),
        }
    }

    fn handle_list(
        &self,
        quiet: bool,
        filter: Option<&str>,
        format: &str,
    ) -> Result<String, ApiError> {
        let filter = InventoryFilter::parse(filter)?;
        match format {
            "json" => self.runtime.block_on(async {
                let config = provider::load_sdk_config().await?;
                let api = AwsFunctionApi::new(&config);
                let reader = InventoryReader::new(&api, i32::from(terminal_rows()));
                let mut rows: Vec<FunctionRow> = Vec::new();
                reader
                    .scan(filter, |row| {
                        rows.push(row);
                        Ok(())
                    })
                    .await?;
                serde_json::to_string_pretty(&rows).map_err(ApiError::from)
            }),
            "text" => self.runtime.block_on(async {
                let config = provider::load_sdk_config().await?;
                let api = AwsFunctionApi::new(&config);
                let page_rows = terminal_rows();
                let reader = InventoryReader::new(&api, i32::from(page_rows));
                let mut pager = InventoryPager::new(usize::from(page_rows), quiet);
                reader.scan(filter, |row| pager.push(row)).await?;
                pager.finish()?;
                Ok(String::new())
            }),
            other => Err(ApiError::ConfigError(format!(
                "Invalid format: {} (must be text or json)",
                other
            ))),
        }
    }

    fn handle_install(
        &self,
        function: &str,
        layer_arn: Option<&str>,
        token: Option<&str>,
    ) -> Result<String, ApiError> {
        let token = self.settings.token_or(token)?;
        self.runtime.block_on(async {
            let config = provider::load_sdk_config().await?;
            let api = AwsFunctionApi::new(&config);
            let reconciler = Reconciler::new(&api);
            match reconciler.install(function, layer_arn, &token).await? {
                InstallOutcome::AlreadyInstalled => Ok(format!(
                    "Function {} already has the agent installed.",
                    function
                )),
                InstallOutcome::Installed { layer } => {
                    Ok(format!("Installed layer {} on {}.", layer.arn, function))
                }
            }
        })
    }

    fn handle_uninstall(
        &self,
        function: &str,
        layer_arn: Option<&str>,
    ) -> Result<String, ApiError> {
        self.runtime.block_on(async {
            let config = provider::load_sdk_config().await?;
            let api = AwsFunctionApi::new(&config);
            let reconciler = Reconciler::new(&api);
            let outcome = reconciler.uninstall(function, layer_arn).await?;
            Ok(format!(
                "Removed layer {} from {}; handler restored to {}.",
                outcome.removed.arn, function, outcome.restored_handler
            ))
        })
    }

    fn handle_stack_command(&self, command: &StackCommands) -> Result<String, ApiError> {
        match command {
            StackCommands::Template {
                input,
                function,
                output,
                token,
            } => {
                let token = self.settings.token_or(token.as_deref())?;
                let region = Settings::aws_region().ok_or(ApiError::RegionMissing)?;
                let registry = HttpLayerRegistry::new(self.settings.api_base_url(), &token);
                let rewriter = TemplateRewriter::new(&registry, &region);
                self.runtime
                    .block_on(rewriter.rewrite_file(input, function, output))
            }
            StackCommands::Update {
                stack_id,
                function,
                token,
            } => {
                let token = self.settings.token_or(token.as_deref())?;
                self.runtime.block_on(async {
                    let config = provider::load_sdk_config().await?;
                    let region = config
                        .region()
                        .map(|r| r.as_ref().to_string())
                        .ok_or(ApiError::RegionMissing)?;
                    let stack_api = AwsStackApi::new(&config);
                    let registry = HttpLayerRegistry::new(self.settings.api_base_url(), &token);
                    let rewriter = TemplateRewriter::new(&registry, &region);
                    rewriter.rewrite_stack(&stack_api, stack_id, function).await
                })
            }
        }
    }
}
