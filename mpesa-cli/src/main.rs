//! M-Pesa CLI
//!
//! Inspect configuration, manage cached tokens and run provider operations
//! from the command line.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

use mpesa_cache::FileTokenCache;
use mpesa_client::HttpTransport;
use mpesa_core::operations::{MSISDN_IDENTIFIER, PAYBILL_COMMAND};
use mpesa_core::{ConfigValidator, CredentialSelector, Mpesa};
use mpesa_types::{CredentialField, MpesaConfig, ServiceKind};

#[derive(Parser)]
#[command(name = "mpesa")]
#[command(author, version, about = "M-Pesa SDK command-line client", long_about = None)]
struct Cli {
    /// JSON configuration file; the MPESA_* variables are used when absent
    #[arg(long, env = "MPESA_CONFIG_FILE")]
    config_file: Option<String>,

    /// File that keeps issued tokens between runs
    #[arg(long, env = "MPESA_TOKEN_CACHE_FILE", default_value = ".mpesa-tokens.json")]
    token_cache: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show configuration status per service, or details for one service
    Config {
        #[arg(long)]
        service: Option<ServiceKind>,
    },
    /// Fetch an access token (cached between runs), or clear cached tokens
    Token {
        #[arg(long)]
        service: Option<ServiceKind>,
        /// Clear cached tokens instead of fetching one; every token unless a service is given
        #[arg(long)]
        clear: bool,
    },
    /// Simulate a C2B payment (sandbox only)
    SimulatePayment {
        phone: String,
        amount: u64,
        #[arg(long, default_value = "TEST")]
        reference: String,
        #[arg(long, default_value = PAYBILL_COMMAND)]
        command: String,
    },
    /// Send an STK push prompt
    StkPush {
        phone: String,
        amount: u64,
        #[arg(long, default_value = "TEST")]
        reference: String,
        #[arg(long, default_value = "Payment")]
        description: String,
    },
    /// Query the status of an STK push
    StkQuery {
        checkout_request_id: String,
    },
    /// Query the account balance
    Balance {
        #[arg(long, default_value = "Balance inquiry")]
        remarks: String,
    },
    /// Query the status of a transaction
    Status {
        transaction_id: String,
        /// Party the transaction was made with (MSISDN)
        #[arg(long)]
        party_a: String,
        #[arg(long, default_value = "Status inquiry")]
        remarks: String,
    },
}

fn load_config(path: Option<&str>) -> Result<MpesaConfig> {
    Ok(match path {
        Some(path) => mpesa_core::config::from_json_file(path)?,
        None => mpesa_core::config::from_env()?,
    })
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}

fn show_status(config: Arc<MpesaConfig>) {
    let selector = CredentialSelector::new(config);
    let validator = ConfigValidator::new(selector.clone());

    println!("Environment: {}", selector.config().environment);
    for (service, result) in validator.validate_all() {
        let source = selector.source(service);
        match result {
            Ok(result) if result.is_valid() => println!("✓ {:<20} {}", service, source),
            Ok(result) => {
                println!("✗ {:<20} {}", service, source);
                for error in &result.errors {
                    println!("    - {}", error);
                }
            }
            Err(e) => println!("✗ {:<20} {}", service, e),
        }
    }
}

fn show_service(config: Arc<MpesaConfig>, service: ServiceKind) -> Result<()> {
    let selector = CredentialSelector::new(config);
    let validator = ConfigValidator::new(selector.clone());
    let (credentials, result) = validator.inspect(service)?;

    println!("Service:     {}", service);
    println!("Credentials: {}", selector.source(service));
    for field in CredentialField::all() {
        let shown = match credentials.get(*field) {
            Some(value) if field.is_secret() => mask(value),
            Some(value) => value.to_string(),
            None => "(missing)".to_string(),
        };
        println!("  {:<20} {}", field.key(), shown);
    }
    println!(
        "Callback:    {}",
        selector
            .config()
            .callbacks
            .url_for(service)
            .unwrap_or("(missing)")
    );

    if result.is_valid() {
        println!("✓ Configuration complete");
    } else {
        println!("✗ Configuration incomplete");
        std::process::exit(1);
    }
    Ok(())
}

/// The SDK over the real HTTP transport and the on-disk token cache.
fn connect(
    config: Arc<MpesaConfig>,
    cache: Arc<FileTokenCache>,
) -> Result<Mpesa<HttpTransport, FileTokenCache>> {
    let transport = HttpTransport::new(&config)?;
    Ok(Mpesa::from_shared(config, Arc::new(transport), cache))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(load_config(cli.config_file.as_deref())?);
    let cache = Arc::new(FileTokenCache::new(&cli.token_cache));

    let response = match cli.command {
        Commands::Config { service: None } => {
            show_status(config);
            return Ok(());
        }

        Commands::Config {
            service: Some(service),
        } => return show_service(config, service),

        Commands::Token {
            service: None,
            clear: true,
        } => {
            let cleared = cache.clear().await;
            println!("✓ Cleared {} cached token(s) from {}", cleared, cli.token_cache);
            return Ok(());
        }

        Commands::Token { service, clear } => {
            let mpesa = connect(config, cache)?;
            if clear {
                mpesa.auth().invalidate(service).await?;
                println!("✓ Cached token cleared");
            } else {
                let token = mpesa.auth().get_token(service).await?;
                println!("{}", token);
            }
            return Ok(());
        }

        Commands::SimulatePayment {
            phone,
            amount,
            reference,
            command,
        } => {
            connect(config, cache)?
                .c2b()
                .simulate(&phone, amount, &reference, &command)
                .await?
        }

        Commands::StkPush {
            phone,
            amount,
            reference,
            description,
        } => {
            connect(config, cache)?
                .stk()
                .push(&phone, amount, &reference, &description, None)
                .await?
        }

        Commands::StkQuery {
            checkout_request_id,
        } => connect(config, cache)?.stk_query(&checkout_request_id).await?,

        Commands::Balance { remarks } => {
            connect(config, cache)?.check_balance(&remarks).await?
        }

        Commands::Status {
            transaction_id,
            party_a,
            remarks,
        } => {
            connect(config, cache)?
                .transaction()
                .status(&transaction_id, &party_a, &remarks, "", MSISDN_IDENTIFIER)
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
