use clap::{Parser, Subcommand};
use loginport_infrastructure::config::{default_config_path, default_log_dir};
use loginport_infrastructure::logging::{init_console_logger, init_logger};
use loginport_lib::presentation::{run_server, ServeOptions};
use loginport_lib::shell::{self, settings, SupervisorOptions};
use std::path::PathBuf;
use tracing::{error, info};

/// AWS LoginPort - one-click AWS console sign-in from a shared roster
#[derive(Parser, Debug)]
#[command(name = "loginport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the roster and serve the listing page
    Serve {
        /// Path to configuration file
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Spreadsheet title (overrides config)
        #[arg(long, value_name = "TITLE")]
        sheet_title: Option<String>,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start the server in the background and open the listing page (default)
    Run {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        #[arg(long, value_name = "TITLE")]
        sheet_title: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open the listing page in the default browser
        #[arg(long)]
        no_open: bool,
    },
    /// Show or edit the configuration file
    Config {
        #[arg(short, long, value_name = "FILE", global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set the spreadsheet title
    SetSheetTitle { title: String },
    /// Set the service-account key path
    SetCredentials { path: String },
}

fn setup_logging(file_name: &str, verbose: bool) {
    if let Err(e) = init_logger(default_log_dir(), file_name, verbose) {
        init_console_logger(verbose);
        tracing::warn!("File logging unavailable, using console only: {}", e);
    }
}

fn resolve_config(path: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    match path {
        Some(path) => Ok(path),
        None => Ok(default_config_path()?),
    }
}

fn fail(e: anyhow::Error) -> ! {
    error!("{:#}", e);
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or(Commands::Run {
        config: None,
        sheet_title: None,
        port: None,
        no_open: false,
    });

    match command {
        Commands::Serve {
            config,
            sheet_title,
            port,
        } => {
            setup_logging("loginport-server.log", cli.verbose);
            info!("🚀 LoginPort server starting...");

            let result = async {
                let options = ServeOptions {
                    config_path: resolve_config(config)?,
                    sheet_title,
                    port,
                };
                run_server(options).await
            }
            .await;

            if let Err(e) = result {
                fail(e);
            }
        }
        Commands::Run {
            config,
            sheet_title,
            port,
            no_open,
        } => {
            setup_logging("loginport-shell.log", cli.verbose);
            info!("🚀 LoginPort starting...");

            let result = async {
                let options = SupervisorOptions {
                    exe: std::env::current_exe()?,
                    config_path: resolve_config(config)?,
                    sheet_title,
                    port,
                    log_dir: default_log_dir(),
                    open_ui: !no_open,
                };
                shell::run(options).await
            }
            .await;

            if let Err(e) = result {
                fail(e);
            }
        }
        Commands::Config { config, action } => {
            init_console_logger(cli.verbose);

            let result = (|| -> anyhow::Result<()> {
                let path = resolve_config(config)?;
                match action {
                    ConfigAction::Show => {
                        println!("# {}", path.display());
                        println!("{}", settings::show(&path)?);
                    }
                    ConfigAction::SetSheetTitle { title } => {
                        settings::set_sheet_title(&path, &title)?;
                        println!("Sheet title set to '{}'", title.trim());
                    }
                    ConfigAction::SetCredentials { path: credentials } => {
                        settings::set_credentials(&path, &credentials)?;
                        println!("Credentials file set to '{}'", credentials.trim());
                    }
                }
                Ok(())
            })();

            if let Err(e) = result {
                fail(e);
            }
        }
    }
}
