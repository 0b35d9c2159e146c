//! HD wallet command-line tool
//!
//! Generates mnemonics, validates them and derives accounts. Private keys are
//! only printed when `--reveal` is given.

use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hd_wallet::{derive_account, AddressScheme, Mnemonic, MnemonicStrength, WalletAccount, WalletSession};

#[derive(Parser)]
#[command(name = "hd-wallet")]
#[command(about = "Hierarchical deterministic wallet tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new mnemonic phrase
    Generate {
        /// Entropy size in bits (128, 160, 192, 224 or 256)
        #[arg(short, long, default_value_t = 128)]
        strength: u32,
    },
    /// Check a mnemonic phrase
    Validate {
        /// The phrase; read from stdin when omitted
        phrase: Option<String>,
    },
    /// Derive accounts from a mnemonic phrase
    Derive {
        /// The phrase; read from stdin when omitted
        #[arg(short, long)]
        mnemonic: Option<String>,

        /// Optional BIP-39 passphrase
        #[arg(short, long, default_value = "")]
        passphrase: String,

        /// Explicit derivation path, e.g. m/44'/60'/0'/0/0
        #[arg(long, conflicts_with = "count")]
        path: Option<String>,

        /// Address scheme: evm, bitcoin or bitcoin-testnet
        #[arg(long, default_value = "evm")]
        scheme: String,

        /// Number of consecutive accounts to derive
        #[arg(short, long, default_value_t = 1)]
        count: u32,

        /// Print private keys
        #[arg(long)]
        reveal: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Generate { strength } => {
            let strength = MnemonicStrength::from_bits(strength)?;
            let mnemonic = Mnemonic::generate(strength)?;
            println!("{}", mnemonic.phrase().as_str());
        }
        Commands::Validate { phrase } => {
            let phrase = phrase_or_stdin(phrase)?;
            Mnemonic::parse(&phrase).context("invalid mnemonic")?;
            println!("valid");
        }
        Commands::Derive {
            mnemonic,
            passphrase,
            path,
            scheme,
            count,
            reveal,
        } => {
            let phrase = phrase_or_stdin(mnemonic)?;
            let scheme: AddressScheme = scheme.parse()?;

            if let Some(path) = path {
                let mut account = derive_account(&phrase, &passphrase, &path, scheme)?;
                if reveal {
                    account.reveal();
                }
                print_account(&account);
                return Ok(());
            }

            if count == 0 {
                bail!("--count must be at least 1");
            }
            let mut session = WalletSession::import(&phrase, &passphrase, scheme)?;
            for n in 0..count as usize {
                session.add_account()?;
                if reveal {
                    session.reveal(n);
                }
            }
            for account in session.accounts() {
                print_account(account);
            }
            session.clear();
        }
    }
    Ok(())
}

fn phrase_or_stdin(phrase: Option<String>) -> Result<String> {
    if let Some(phrase) = phrase {
        return Ok(phrase);
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read mnemonic from stdin")?;
    Ok(line)
}

fn print_account(account: &WalletAccount) {
    println!("path:        {}", account.path());
    println!("address:     {}", account.address());
    println!("public key:  {}", account.public_key_hex());
    if let Some(private_key) = account.private_key_hex() {
        println!("private key: {}", private_key.as_str());
    }
    println!();
}
