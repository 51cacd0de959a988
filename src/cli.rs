//! CLI definition and dispatch.

use alloy_primitives::Address;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::local_router_adapter::LocalRouterAdapter;
use crate::adapters::routing_api_adapter::RoutingApiAdapter;
use crate::domain::config_validation::{fee_mismatch, validate_config};
use crate::domain::error::CharitySwapError;
use crate::domain::funds::{DonationCall, Fund, list_funds, parse_ether};
use crate::domain::quote::{QuoteArgs, QuoteResult, TradeType, parse_amount};
use crate::domain::routing::QuoteService;
use crate::domain::settings::Settings;
use crate::logging::{DEFAULT_LOG_LEVEL, setup_logging};
use crate::ports::quote_port::QuotePort;

#[derive(Parser, Debug)]
#[command(name = "charityswap", about = "Swap quotes with a built-in charity donation")]
pub struct Cli {
    /// Log filter: a level (`debug`) or a directive list (`warn,charityswap=trace`)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch a fee-adjusted quote
    Quote {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        token_in: Address,
        #[arg(long)]
        token_out: Address,
        /// Amount in the smallest unit of the fixed side
        #[arg(long)]
        amount: String,
        #[arg(long, default_value_t = 1)]
        chain_id: u64,
        /// Destination chain, when it differs from the source chain
        #[arg(long)]
        out_chain_id: Option<u64>,
        /// Quote the input needed for an exact output amount
        #[arg(long)]
        exact_out: bool,
    },
    /// List the charity funds
    Funds,
    /// Show the contract call for a donation
    Donation {
        #[arg(long)]
        fund: String,
        /// Amount in ether, e.g. 0.5
        #[arg(long)]
        amount: String,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Start the quote server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let logging = LogOptions {
        level: cli.log_level,
        json: cli.json_logs,
    };
    match cli.command {
        Command::Quote {
            config,
            token_in,
            token_out,
            amount,
            chain_id,
            out_chain_id,
            exact_out,
        } => {
            let trade_type = if exact_out {
                TradeType::ExactOutput
            } else {
                TradeType::ExactInput
            };
            let amount = match parse_amount(&amount) {
                Ok(a) => a,
                Err(e) => return fail(&e),
            };
            let args = QuoteArgs {
                token_in_address: token_in,
                token_in_chain_id: chain_id,
                token_out_address: token_out,
                token_out_chain_id: out_chain_id.unwrap_or(chain_id),
                amount,
                trade_type,
            };
            run_quote(&config, &logging, &args)
        }
        Command::Funds => {
            logging.install(None);
            run_funds()
        }
        Command::Donation { fund, amount } => {
            logging.install(None);
            run_donation(&fund, &amount)
        }
        Command::Validate { config } => run_validate(&config, &logging),
        Command::Serve { config } => run_serve(&config, &logging),
    }
}

/// Logging flags from the command line; they win over the config file.
struct LogOptions {
    level: Option<String>,
    json: bool,
}

impl LogOptions {
    fn install(&self, settings: Option<&Settings>) {
        let level = self
            .level
            .as_deref()
            .or_else(|| settings.and_then(|s| s.log_level.as_deref()))
            .unwrap_or(DEFAULT_LOG_LEVEL);
        let json = self.json || settings.is_some_and(|s| s.json_logs);
        setup_logging(level, json);
    }
}

fn fail(err: &CharitySwapError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = CharitySwapError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        fail(&err)
    })
}

/// Load, validate and resolve a config file, then install logging from it.
fn load_settings(path: &PathBuf, logging: &LogOptions) -> Result<Settings, ExitCode> {
    let config = load_config(path)?;
    let settings = Settings::from_config(&config).map_err(|e| fail(&e))?;
    logging.install(Some(&settings));
    validate_config(&config).map_err(|e| fail(&e))?;
    Ok(settings)
}

/// Wire the quote sources described by `settings`.
pub fn build_quote_service(settings: &Settings) -> Result<QuoteService, CharitySwapError> {
    let remote = match &settings.router_url {
        Some(url) => {
            let adapter = RoutingApiAdapter::new(url, &settings.protocols, settings.timeout)?;
            Some(Arc::new(adapter) as Arc<dyn QuotePort>)
        }
        None => None,
    };
    let local = Arc::new(LocalRouterAdapter::new(
        settings.pools_file.clone(),
        settings.max_hops,
    ));
    Ok(QuoteService::new(remote, local, settings.fee).with_ttl(settings.cache_ttl))
}

fn runtime() -> Result<tokio::runtime::Runtime, CharitySwapError> {
    Ok(tokio::runtime::Runtime::new()?)
}

fn run_quote(config_path: &PathBuf, logging: &LogOptions, args: &QuoteArgs) -> ExitCode {
    let settings = match load_settings(config_path, logging) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let service = match build_quote_service(&settings) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let rt = match runtime() {
        Ok(rt) => rt,
        Err(e) => return fail(&e),
    };

    let result = match rt.block_on(service.get_quote(args)) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    let json = match serde_json::to_string_pretty(&result) {
        Ok(j) => j,
        Err(e) => {
            return fail(&CharitySwapError::MalformedQuote {
                reason: e.to_string(),
            });
        }
    };
    println!("{json}");

    match result {
        QuoteResult::NoRoute => eprintln!("No route found"),
        QuoteResult::Quote(_) => {
            let fee = service.fee();
            let side = match args.trade_type {
                TradeType::ExactInput => "output reduced",
                TradeType::ExactOutput => "input increased",
            };
            eprintln!("Donation fee {fee} applied ({side})");
            eprintln!(
                "Donation on a trade of {}: {}",
                args.amount,
                fee.donation_on(args.amount)
            );
        }
    }
    ExitCode::SUCCESS
}

fn run_funds() -> ExitCode {
    for fund in list_funds() {
        match fund.address {
            Some(address) => println!("{:<20} {address}", fund.name),
            None => println!("{:<20} (chosen by the contract)", fund.name),
        }
    }
    ExitCode::SUCCESS
}

fn run_donation(fund_name: &str, amount: &str) -> ExitCode {
    let fund = match Fund::from_name(fund_name) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };
    let value = match parse_ether(amount) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };
    let call = match DonationCall::for_fund(fund, value) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    info!(fund = %fund, function = call.function_name(), "planned donation");
    println!("{call}");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf, logging: &LogOptions) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let settings = match load_settings(config_path, logging) {
        Ok(s) => s,
        Err(code) => return code,
    };

    match &settings.router_url {
        Some(url) => eprintln!("  Routing API:   {url}"),
        None => eprintln!("  Routing API:   (none, local router only)"),
    }
    eprintln!("  Protocols:     {}", settings.protocols.join(","));
    match &settings.pools_file {
        Some(path) => eprintln!("  Pools file:    {}", path.display()),
        None => eprintln!("  Pools file:    (none)"),
    }
    eprintln!("  Max hops:      {}", settings.max_hops);
    eprintln!("  Donation fee:  {}", settings.fee);
    eprintln!("  Cache TTL:     {}s", settings.cache_ttl.as_secs());
    if let Some(message) = fee_mismatch(&settings.fee, settings.contract_fee_ppm) {
        eprintln!("  warning: {message}");
    }
    if settings.router_url.is_none() && settings.pools_file.is_none() {
        warn!("neither a routing API nor a pools file is configured; every quote will fail");
    }

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_serve(config_path: &PathBuf, logging: &LogOptions) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{AppState, build_router};

        let settings = match load_settings(config_path, logging) {
            Ok(s) => s,
            Err(code) => return code,
        };
        let service = match build_quote_service(&settings) {
            Ok(s) => s,
            Err(e) => return fail(&e),
        };
        let rt = match runtime() {
            Ok(rt) => rt,
            Err(e) => return fail(&e),
        };

        let router = build_router(AppState {
            quotes: Arc::new(service),
        });
        let addr = settings.listen;

        let served: Result<(), CharitySwapError> = rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!(%addr, "quote server listening");
            axum::serve(listener, router).await?;
            Ok(())
        });
        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = (config_path, logging);
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}
