//! CLI entry point for ws1, a Workspace ONE UEM REST API client.
//!
//! Loads settings from flags, environment variables and an optional `.env`
//! file, signs requests with the configured PKCS#12 certificate, and prints
//! API responses as pretty JSON on stdout.
//!
//! Exit codes:
//! - 0: success
//! - 1: runtime error (configuration, certificate, signing, API error)
//! - 2: argument validation error (clap handles this automatically)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use ws1_uem::auth::CmsUrlSigner;
use ws1_uem::client::{RetryPolicy, UemClient};
use ws1_uem::environment::Environment;
use ws1_uem::error::{Result, UemError};
use ws1_uem::health::{self, DEFAULT_PAGE_SIZE};
use ws1_uem::mdm::{self, DeviceLookup};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// REST API root including the /API segment (e.g. https://as1506.awmdm.com/API).
    #[arg(long, env = "WS1_API_URL", global = true)]
    api_url: Option<String>,

    /// REST API key sent as the aw-tenant-code header.
    #[arg(long, env = "WS1_TENANT_CODE", global = true, hide_env_values = true)]
    tenant_code: Option<String>,

    /// Parent organization group id, used when a command needs a default OG.
    #[arg(long, env = "WS1_PARENT_OG_ID", global = true)]
    parent_og: Option<String>,

    /// Path to the PKCS#12 client certificate.
    #[arg(long, env = "WS1_CERT_PATH", global = true)]
    cert_path: Option<PathBuf>,

    /// Password of the PKCS#12 bundle. Prefer the WS1_CERT_PW environment
    /// variable to keep it out of process listings and shell history.
    #[arg(long, env = "WS1_CERT_PW", global = true, hide_env_values = true)]
    cert_pw: Option<String>,

    /// Send each request once, without retrying transient server errors.
    #[arg(long, global = true)]
    no_retry: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the CMSURL Authorization header for a URL.
    Sign {
        /// Absolute request URL; only its path is signed.
        url: String,
    },
    /// Retrieve device details by serial number.
    Device {
        /// Hardware serial number.
        #[arg(long)]
        serial: String,
    },
    /// Run the extensive device search.
    Lookup(LookupArgs),
    /// Collect every page of the device health check report.
    HealthReport {
        /// Organization group id; defaults to --parent-og.
        #[arg(long)]
        og_id: Option<String>,

        /// Devices per page.
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,
    },
}

/// Exactly one identifier per lookup.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct LookupArgs {
    /// Hardware serial number.
    #[arg(long)]
    serial: Option<String>,

    /// UEM device id.
    #[arg(long)]
    device_id: Option<String>,
}

fn main() -> ExitCode {
    // A missing .env file is normal; flags and the process environment still apply.
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{output}"),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Cli) -> Result<Value> {
    let signer = signer(&args)?;
    let client = |signer: CmsUrlSigner| -> Result<UemClient> {
        let environment = Environment::new(
            args.api_url.as_deref().unwrap_or_default(),
            args.tenant_code.as_deref().unwrap_or_default(),
            args.parent_og.as_deref(),
        )?;
        let retry = if args.no_retry {
            RetryPolicy::disabled()
        } else {
            RetryPolicy::default()
        };
        UemClient::builder(environment, signer)
            .retry_policy(retry)
            .build()
    };

    match &args.command {
        Command::Sign { url } => {
            let header = signer.header_for(url)?;
            Ok(Value::String(header.into_string()))
        }
        Command::Device { serial } => mdm::retrieve_device_information(&client(signer)?, serial),
        Command::Lookup(lookup) => {
            let lookup = match (&lookup.serial, &lookup.device_id) {
                (Some(serial), _) => DeviceLookup::SerialNumber(serial.clone()),
                (None, Some(id)) => DeviceLookup::DeviceId(id.clone()),
                (None, None) => {
                    return Err(UemError::Config {
                        message: "lookup needs --serial or --device-id".to_string(),
                    })
                }
            };
            mdm::extensive_search_device(&client(signer)?, &lookup)
        }
        Command::HealthReport { og_id, page_size } => {
            let client = client(signer)?;
            let og_id = og_id
                .clone()
                .or_else(|| client.environment().parent_og().map(str::to_owned))
                .ok_or_else(|| UemError::Config {
                    message: "health-report needs --og-id or --parent-og".to_string(),
                })?;
            let devices = health::collect_device_health(&client, &og_id, *page_size)?;
            Ok(Value::Array(devices))
        }
    }
}

fn signer(args: &Cli) -> Result<CmsUrlSigner> {
    let path = args.cert_path.clone().ok_or_else(|| UemError::Config {
        message: "certificate path is required (--cert-path or WS1_CERT_PATH)".to_string(),
    })?;
    let password = args.cert_pw.clone().ok_or_else(|| UemError::Config {
        message: "certificate password is required (--cert-pw or WS1_CERT_PW)".to_string(),
    })?;
    CmsUrlSigner::from_file(path, SecretString::from(password))
}
