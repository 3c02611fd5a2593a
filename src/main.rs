use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use volt_wallet_core::amm::{apply_slippage, DEFAULT_SLIPPAGE_BPS};
use volt_wallet_core::tx::{sign_in_place, SignedTransaction};
use volt_wallet_core::utils::logging::enable_debug;
use volt_wallet_core::utils::network_config::validate_endpoint;
use volt_wallet_core::wallet::{address_from_private_key, FileKeyStore, KeyStore};
use volt_wallet_core::{
    compute_tx_hash, create_wallet, format_amount, parse_amount, quote_output, restore_wallet, validate_address,
    verify_transaction, NodeApi, NodeClient, NodeConfig, Transaction, TxKind, WalletKeys, WalletSession,
    NATIVE_TOKEN,
};

const ENV_MNEMONIC: &str = "VOLT_MNEMONIC";
const ENV_KEYSTORE_PASSWORD: &str = "VOLT_KEYSTORE_PASSWORD";

#[derive(Parser)]
#[command(name = "volt-wallet")]
#[command(about = "Volt wallet - keys, signing and node access for the Volt chain", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Node RPC URL (overrides VOLT_NODE_URL)
    #[arg(long, global = true)]
    node: Option<String>,

    /// Node RPC password (overrides VOLT_RPC_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct WalletSource {
    /// Mnemonic phrase (falls back to VOLT_MNEMONIC)
    #[arg(long)]
    mnemonic: Option<String>,

    /// Keystore file written by `new --save`
    #[arg(long, conflicts_with = "mnemonic")]
    keystore: Option<PathBuf>,

    /// Password of an encrypted keystore (falls back to VOLT_KEYSTORE_PASSWORD)
    #[arg(long)]
    keystore_password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet
    New {
        /// Persist the keys to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Encrypt the saved file with this password
        #[arg(long, requires = "save")]
        keystore_password: Option<String>,
    },

    /// Re-derive keys from a mnemonic phrase
    Restore {
        /// The twelve (or more) words
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// Address for a hex private key
    Address { private_key: String },

    /// Canonical hash of a transaction record (JSON text, file path, or stdin)
    Hash { tx: Option<String> },

    /// Sign a transaction record
    Sign {
        tx: Option<String>,

        /// Hex private key; otherwise the wallet source is used
        #[arg(long)]
        private_key: Option<String>,

        #[command(flatten)]
        wallet: WalletSource,
    },

    /// Check the signature of a transaction record
    Verify { tx: Option<String> },

    /// Constant-product swap quote
    Quote {
        reserve_in: u64,
        reserve_out: u64,
        amount_in: u64,

        /// Slippage tolerance in basis points
        #[arg(long, default_value_t = DEFAULT_SLIPPAGE_BPS)]
        slippage_bps: u64,
    },

    /// Balance, stake, nonce and token holdings of an address
    Balance { address: String },

    /// Liquidity pools on the node
    Pools,

    /// Send tokens through a wallet session
    Send {
        /// Recipient address
        to: String,

        /// Amount in whole tokens, e.g. 1.5
        amount: String,

        #[arg(long, default_value = NATIVE_TOKEN)]
        token: String,

        /// Fee in whole tokens; defaults to the node's schedule
        #[arg(long)]
        fee: Option<String>,

        #[command(flatten)]
        wallet: WalletSource,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        enable_debug();
    }

    match &cli.command {
        Commands::New { save, keystore_password } => {
            let keys = create_wallet()?;
            if let Some(path) = save {
                let store = match keystore_password {
                    Some(pw) => FileKeyStore::encrypted(path, pw),
                    None => FileKeyStore::new(path),
                };
                store.save(&keys)?;
            }
            if cli.json {
                print_json(&keys)?;
            } else {
                println!("Mnemonic:    {}", keys.mnemonic);
                println!("Address:     {}", keys.address);
                println!("Private key: {}", keys.private_key);
                println!("Write the mnemonic down; it is the only way to recover this wallet.");
                if let Some(path) = save {
                    println!("Saved to {}", path.display());
                }
            }
        }

        Commands::Restore { words } => {
            let keys = restore_wallet(&words.join(" "))?;
            if cli.json {
                print_json(&keys)?;
            } else {
                println!("Address:     {}", keys.address);
                println!("Private key: {}", keys.private_key);
            }
        }

        Commands::Address { private_key } => {
            let address = address_from_private_key(private_key)?;
            if cli.json {
                print_json(&serde_json::json!({ "address": address }))?;
            } else {
                println!("{}", address);
            }
        }

        Commands::Hash { tx } => {
            let tx = read_transaction(tx.as_deref())?;
            let hash = compute_tx_hash(&tx);
            if cli.json {
                print_json(&serde_json::json!({ "hash": hash }))?;
            } else {
                println!("{}", hash);
            }
        }

        Commands::Sign { tx, private_key, wallet } => {
            let mut transaction = read_transaction(tx.as_deref())?;
            match private_key {
                Some(pk) => sign_in_place(&mut transaction, pk)?,
                None => sign_in_place(&mut transaction, &load_keys(wallet)?.private_key)?,
            }
            let signed = SignedTransaction {
                hash: compute_tx_hash(&transaction),
                transaction,
            };
            if cli.json {
                print_json(&signed)?;
            } else {
                println!("Hash:      {}", signed.hash);
                println!("Signature: {}", signed.transaction.signature);
            }
        }

        Commands::Verify { tx } => {
            let tx = read_transaction(tx.as_deref())?;
            let valid = verify_transaction(&tx)?;
            if cli.json {
                print_json(&serde_json::json!({ "hash": compute_tx_hash(&tx), "valid": valid }))?;
            } else {
                println!("{}", if valid { "Signature valid" } else { "Signature INVALID" });
            }
            if !valid {
                bail!("signature does not match sender");
            }
        }

        Commands::Quote { reserve_in, reserve_out, amount_in, slippage_bps } => {
            let amount_out = quote_output(*reserve_in, *reserve_out, *amount_in);
            let min_output = apply_slippage(amount_out, *slippage_bps);
            if cli.json {
                print_json(&serde_json::json!({
                    "amount_out": amount_out,
                    "min_output": min_output,
                    "slippage_bps": slippage_bps,
                }))?;
            } else {
                println!("Expected output: {}", amount_out);
                println!("Minimum output:  {} ({} bps slippage)", min_output, slippage_bps);
            }
        }

        Commands::Balance { address } => {
            let address = validate_address(address)?;
            let client = node_client(&cli)?;
            let info = client.get_balance(&address)?;
            let assets = client.get_assets(&address)?;
            if cli.json {
                print_json(&serde_json::json!({ "account": info, "assets": assets }))?;
            } else {
                println!("Balance: {} {}", format_amount(info.balance), NATIVE_TOKEN);
                println!("Staked:  {} {}", format_amount(info.staked), NATIVE_TOKEN);
                println!("Nonce:   {}", info.nonce);
                let mut tokens: Vec<_> = assets.iter().filter(|(t, _)| t.as_str() != NATIVE_TOKEN).collect();
                tokens.sort();
                for (token, amount) in tokens {
                    println!("  {:<10} {}", token, format_amount(*amount));
                }
            }
        }

        Commands::Pools => {
            let pools = node_client(&cli)?.get_pools()?;
            if cli.json {
                print_json(&pools)?;
            } else if pools.is_empty() {
                println!("No pools");
            } else {
                for pool in &pools {
                    println!(
                        "{:<16} {} / {}  shares {}",
                        pool.id(),
                        format_amount(pool.reserve_a),
                        format_amount(pool.reserve_b),
                        format_amount(pool.total_shares)
                    );
                }
            }
        }

        Commands::Send { to, amount, token, fee, wallet } => {
            let receiver = validate_address(to)?;
            let amount = parse_amount(amount).context("invalid amount")?;
            let fee = fee
                .as_deref()
                .map(parse_amount)
                .transpose()
                .context("invalid fee")?;

            let client = node_client(&cli)?;
            let session = WalletSession::new(load_keys(wallet)?);
            let kind = TxKind::Transfer {
                receiver,
                amount,
                token: token.clone(),
            };
            let result = session.submit_with_fee(&client, kind, fee)?;
            if cli.json {
                print_json(&result)?;
            } else {
                println!("Sent {} {} (nonce {})", format_amount(amount), token, result.nonce);
                println!("Hash: {}", result.hash);
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn node_client(cli: &Cli) -> Result<NodeClient> {
    let mut config = NodeConfig::from_env()?;
    if let Some(url) = &cli.node {
        config = config.with_url(url)?;
    }
    if let Some(pw) = &cli.password {
        config = config.with_password(pw.as_str());
    }
    for warning in validate_endpoint(&config.url).warnings {
        eprintln!("warning: {}", warning);
    }
    Ok(NodeClient::new(config)?)
}

/// Resolve the signing wallet from flags, then environment
fn load_keys(source: &WalletSource) -> Result<WalletKeys> {
    if let Some(path) = &source.keystore {
        let password = source
            .keystore_password
            .clone()
            .or_else(|| std::env::var(ENV_KEYSTORE_PASSWORD).ok());
        let store = match password {
            Some(pw) => FileKeyStore::encrypted(path, &pw),
            None => FileKeyStore::new(path),
        };
        return store
            .load()?
            .with_context(|| format!("no wallet stored in {}", path.display()));
    }

    let phrase = match &source.mnemonic {
        Some(phrase) => phrase.clone(),
        None => std::env::var(ENV_MNEMONIC)
            .with_context(|| format!("pass --mnemonic, --keystore, or set {}", ENV_MNEMONIC))?,
    };
    Ok(restore_wallet(&phrase)?)
}

/// Transaction JSON from an inline argument, a file, or stdin
fn read_transaction(arg: Option<&str>) -> Result<Transaction> {
    let text = match arg {
        Some(s) if s.trim_start().starts_with('{') => s.to_string(),
        Some("-") | None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("cannot read {}", path))?,
    };
    serde_json::from_str(&text).context("transaction JSON does not match the wire record")
}
