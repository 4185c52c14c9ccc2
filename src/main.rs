//! Neobank gateway CLI
//!
//! Runs the HTTP gateway and exposes the same chain operations for
//! operators working from a shell.

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use neobank_gateway::api::{self, AppState};
use neobank_gateway::chain::{self, units::parse_units, ChainReader, RpcChainReader};
use neobank_gateway::config::env_vars;
use neobank_gateway::sequencer::{Intent, Sequencer, SequencerSettings};
use neobank_gateway::wallet::{LocalSender, SecureWallet};
use neobank_gateway::{calldata, networks, Config, Error, Result, RpcConfig};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "neobank")]
#[command(about = "Stablecoin neobank gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP gateway
    Serve,

    /// Read an ERC-20 balance
    Balance {
        #[arg(long)]
        token: String,

        #[arg(long)]
        owner: String,
    },

    /// Read an ERC-20 allowance
    Allowance {
        #[arg(long)]
        token: String,

        #[arg(long)]
        owner: String,

        #[arg(long)]
        spender: String,
    },

    /// Print calldata for a single call without sending it
    Encode {
        #[command(subcommand)]
        call: EncodeCommand,
    },

    /// Run an invest flow with the PRIVATE_KEY signer
    Invest {
        /// savings or growth
        #[arg(long)]
        strategy: String,

        /// Human-readable PYUSD amount (e.g. "25.5")
        #[arg(long)]
        amount: String,
    },

    /// Show the configured PYUSD/USDC pool for a network
    Pool {
        /// Network (ethereum, arbitrum, optimism, base)
        #[arg(short, long, default_value = "ethereum")]
        network: String,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum EncodeCommand {
    Approve {
        #[arg(long)]
        token: String,
        #[arg(long)]
        spender: String,
        /// Amount in base units
        #[arg(long)]
        amount: String,
    },
    Transfer {
        #[arg(long)]
        token: String,
        #[arg(long)]
        to: String,
        /// Amount in base units
        #[arg(long)]
        amount: String,
    },
    Supply {
        #[arg(long)]
        asset: String,
        /// Amount in base units
        #[arg(long)]
        amount: String,
        #[arg(long)]
        on_behalf_of: String,
    },
    KycMint,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let config = Config::load(cli.config.as_deref())?;
    let rpc = RpcConfig::from_env();

    match cli.command {
        Commands::Serve => {
            let state = AppState::from_config(config, &rpc)?;
            api::serve(state).await?;
        }
        Commands::Balance { token, owner } => {
            let reader = RpcChainReader::connect(&rpc, config.chain_id, config.transport)?;
            let balance =
                chain::read_balance(&reader, parse_address(&token)?, parse_address(&owner)?).await?;
            print_json(&balance)?;
        }
        Commands::Allowance {
            token,
            owner,
            spender,
        } => {
            let reader = RpcChainReader::connect(&rpc, config.chain_id, config.transport)?;
            let allowance = chain::read_allowance(
                &reader,
                parse_address(&token)?,
                parse_address(&owner)?,
                parse_address(&spender)?,
            )
            .await?;
            print_json(&allowance)?;
        }
        Commands::Encode { call } => {
            let tx = encode(call, &config)?;
            print_json(&tx)?;
        }
        Commands::Invest { strategy, amount } => {
            run_invest(&config, &rpc, &strategy, &amount).await?;
        }
        Commands::Pool { network } => {
            let net = networks::parse_network(&network)
                .ok_or_else(|| Error::InvalidArgument(format!("Unknown network: {}", network)))?;
            let pools = networks::pools(net.chain_id);
            if pools.is_empty() {
                println!("No pools configured on {}", net.name);
            }
            for pool in pools {
                print_json(&pool)?;
            }
        }
        Commands::Config => {
            print_json(&config)?;
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_address(value: &str) -> Result<Address> {
    Address::from_str(value)
        .map_err(|_| Error::InvalidArgument(format!("Invalid address: {}", value)))
}

fn parse_amount(value: &str) -> Result<U256> {
    U256::from_str(value)
        .map_err(|_| Error::InvalidArgument(format!("Invalid amount: {}", value)))
}

fn encode(call: EncodeCommand, config: &Config) -> Result<calldata::TxRequest> {
    match call {
        EncodeCommand::Approve {
            token,
            spender,
            amount,
        } => Ok(calldata::approve(
            parse_address(&token)?,
            parse_address(&spender)?,
            parse_amount(&amount)?,
        )),
        EncodeCommand::Transfer { token, to, amount } => Ok(calldata::transfer(
            parse_address(&token)?,
            parse_address(&to)?,
            parse_amount(&amount)?,
        )),
        EncodeCommand::Supply {
            asset,
            amount,
            on_behalf_of,
        } => {
            let network = networks::network(config.chain_id)
                .ok_or(Error::UnsupportedChain(config.chain_id))?;
            let pool = network.contracts.aave_pool.ok_or_else(|| {
                Error::Config(format!("No Aave pool configured on {}", network.name))
            })?;
            Ok(calldata::aave_supply(
                pool,
                parse_address(&asset)?,
                parse_amount(&amount)?,
                parse_address(&on_behalf_of)?,
            ))
        }
        EncodeCommand::KycMint => {
            let token = config
                .kyc_token
                .ok_or_else(|| Error::Config(format!("{} is not set", env_vars::KYC_TOKEN_ADDRESS)))?;
            Ok(calldata::kyc_mint(token))
        }
    }
}

async fn run_invest(config: &Config, rpc: &RpcConfig, strategy: &str, amount: &str) -> Result<()> {
    use neobank_gateway::tokens::registry;
    use neobank_gateway::yield_projection::Strategy;

    let strategy: Strategy = strategy.parse()?;
    let chain_id = config.chain_id;
    let wallet = SecureWallet::from_env(env_vars::PRIVATE_KEY)?;
    tracing::info!(address = %wallet.address(), "Loaded wallet from {}", env_vars::PRIVATE_KEY);

    let rpc_url = rpc
        .get(chain_id)
        .ok_or_else(|| Error::Config(format!("No RPC URL for chain {}", chain_id)))?;
    let reader = RpcChainReader::connect(rpc, chain_id, config.transport)?;
    let sender = LocalSender::connect(&wallet, rpc_url)?;

    let pyusd = registry()
        .by_symbol(chain_id, "PYUSD")
        .ok_or_else(|| Error::InvalidArgument(format!("PYUSD is not available on chain {}", chain_id)))?;
    let amount = parse_units(amount, pyusd.decimals)?;

    let intent = match strategy {
        Strategy::Savings => Intent::AaveDeposit {
            asset: pyusd.address,
            amount,
        },
        Strategy::Growth => {
            let usdc = registry()
                .by_symbol(chain_id, "USDC")
                .ok_or_else(|| Error::InvalidArgument(format!("USDC is not available on chain {}", chain_id)))?;
            let pool = networks::find_pool(chain_id, pyusd.address, usdc.address)
                .ok_or_else(|| Error::InvalidArgument(format!("No PYUSD/USDC pool on chain {}", chain_id)))?;
            Intent::Invest {
                base: pyusd.address,
                quote: usdc.address,
                fee: pool.fee,
                amount,
            }
        }
    };

    tracing::info!(chain_id = reader.chain_id(), ?strategy, %amount, "Running invest flow");
    let sequencer = Sequencer::new(&reader, &sender, SequencerSettings::from(&config.sequencer))?;
    match sequencer.run(intent).await {
        Ok(report) => print_json(&report),
        Err(e) => {
            eprintln!("{}", e.message);
            for tx in &e.submitted {
                eprintln!("  already submitted: {:?} {}", tx.kind, tx.hash);
            }
            Err(e.source)
        }
    }
}
