use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "billgate")]
#[command(about = "Billing message gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Create the configuration directory and a default config file.
    Init {
        /// Config file path (default: BILLGATE_CONFIG_PATH or ~/.billgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Run the gateway (HTTP message pipeline). Requires a configured backend
    /// base URL (backend.baseUrl or BILLGATE_BACKEND_URL).
    Gateway {
        /// Config file path (default: BILLGATE_CONFIG_PATH or ~/.billgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 5000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send one message to a running gateway and print the response envelope.
    Send {
        /// The free-text message to send.
        message: String,

        /// Sender credential forwarded to the backend as a bearer token.
        #[arg(long)]
        sender: Option<String>,

        /// Optional message id (used as the audit response_to).
        #[arg(long, value_name = "ID")]
        message_id: Option<String>,

        /// Config file path (default: BILLGATE_CONFIG_PATH or ~/.billgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("billgate {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            message,
            sender,
            message_id,
            config,
        }) => {
            if let Err(e) = run_send(config, message, sender, message_id).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(lib::config::default_config_path);
    let dir = lib::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", dir.display());
    Ok(())
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!("starting gateway on {}:{}", config.gateway.bind, config.gateway.port);
    lib::gateway::run_gateway(config).await
}

async fn run_send(
    config_path: Option<std::path::PathBuf>,
    message: String,
    sender: Option<String>,
    message_id: Option<String>,
) -> anyhow::Result<()> {
    let (config, _) = lib::config::load_config(config_path)?;
    let url = format!(
        "http://{}:{}/gateway/message",
        config.gateway.bind.trim(),
        config.gateway.port
    );

    let mut body = serde_json::json!({ "message": message });
    if let Some(s) = sender {
        body["sender"] = serde_json::Value::String(s);
    }
    if let Some(id) = message_id {
        body["message_id"] = serde_json::Value::String(id);
    }

    let res = reqwest::Client::new().post(&url).json(&body).send().await?;
    let status = res.status();
    let envelope: lib::envelope::ResponseEnvelope = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if !status.is_success() {
        anyhow::bail!("gateway returned {}", status);
    }
    Ok(())
}
