use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use localops_client::{response, ClientConfig, KeyMaterial, LocalSigner, SignerEntry};
use localops_codec::{decode_hex, transaction_from_json};
use localops_crypto::Algorithm;
use localops_keyring::SeedInput;
use localops_log::LogFormat;
use localops_types::{AccountId, Transaction};
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "localops",
    about = "Offline signing and wallet tooling for XRP Ledger transactions",
    version,
    author
)]
struct Cli {
    #[arg(long, global = true, value_name = "FILE", help = "Configuration file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, value_name = "LEVEL", help = "Log level (trace, debug, info, warn, error)")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign a transaction with a single key")]
    Sign {
        #[arg(long, value_name = "FILE", help = "Transaction JSON file, or - for stdin")]
        tx: PathBuf,

        #[command(flatten)]
        key: KeyArgs,
    },

    #[command(about = "Add a multi-signature for one account")]
    SignFor {
        #[arg(long, value_name = "FILE", help = "Transaction JSON file, or - for stdin")]
        tx: PathBuf,

        #[arg(long, value_name = "ADDR", help = "Account the signature is made for")]
        account: String,

        #[command(flatten)]
        key: KeyArgs,
    },

    #[command(about = "Combine multi-signed copies of one transaction")]
    Combine {
        #[arg(value_name = "FILE", required = true, help = "Transaction JSON files carrying Signers")]
        files: Vec<PathBuf>,
    },

    #[command(about = "Generate a seed, key pair and address")]
    WalletPropose {
        #[command(flatten)]
        seed: SeedArgs,

        #[arg(long, value_name = "TYPE", value_parser = parse_key_type, help = "secp256k1 or ed25519")]
        key_type: Option<Algorithm>,
    },

    #[command(about = "Decode a hex transaction blob")]
    Decode {
        #[arg(value_name = "BLOB", help = "Hex encoded transaction blob")]
        blob: String,
    },

    #[command(about = "Display version information")]
    Version,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct KeySource {
    #[arg(long, value_name = "SEED", help = "Encoded seed (s... or sEd...)")]
    secret: Option<String>,

    #[arg(long, value_name = "HEX", help = "Seed entropy as 32 hex characters")]
    seed_hex: Option<String>,

    #[arg(long, value_name = "PHRASE", help = "Passphrase to derive the seed from")]
    passphrase: Option<String>,
}

#[derive(Args)]
struct KeyArgs {
    #[command(flatten)]
    source: KeySource,

    #[arg(long, value_name = "TYPE", value_parser = parse_key_type, help = "secp256k1 or ed25519")]
    key_type: Option<Algorithm>,
}

impl KeyArgs {
    fn material(&self) -> Result<KeyMaterial> {
        let algorithm = self.key_type;
        let source = &self.source;
        if let Some(seed) = &source.secret {
            Ok(KeyMaterial::seed(seed.clone(), algorithm))
        } else if let Some(hex) = &source.seed_hex {
            Ok(KeyMaterial::seed_hex(hex.clone(), algorithm))
        } else if let Some(passphrase) = &source.passphrase {
            Ok(KeyMaterial::passphrase(passphrase.clone(), algorithm))
        } else {
            bail!("one of --secret, --seed-hex or --passphrase is required")
        }
    }
}

#[derive(Args)]
#[group(required = false, multiple = false)]
struct SeedArgs {
    #[arg(long, value_name = "SEED", help = "Encoded seed (s... or sEd...)")]
    seed: Option<String>,

    #[arg(long, value_name = "HEX", help = "Seed entropy as 32 hex characters")]
    seed_hex: Option<String>,

    #[arg(long, value_name = "PHRASE", help = "Passphrase to derive the seed from")]
    passphrase: Option<String>,
}

impl SeedArgs {
    fn input(&self) -> SeedInput {
        if let Some(seed) = &self.seed {
            SeedInput::Encoded(seed.clone())
        } else if let Some(hex) = &self.seed_hex {
            SeedInput::Hex(hex.clone())
        } else if let Some(passphrase) = &self.passphrase {
            SeedInput::Passphrase(passphrase.clone())
        } else {
            SeedInput::Random
        }
    }
}

fn parse_key_type(s: &str) -> std::result::Result<Algorithm, String> {
    s.parse().map_err(|e: localops_errors::Error| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        return version_command();
    }

    let config = ClientConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    setup_logging(&config, cli.log_level.as_deref())?;
    let signer = LocalSigner::new(config);

    match run(&signer, cli.command) {
        Ok(value) => {
            print_json(&value)?;
            Ok(())
        }
        Err(err) => match err.downcast_ref::<localops_errors::Error>() {
            Some(core) => {
                tracing::debug!(kind = core.kind(), "operation failed");
                print_json(&response::error(core))?;
                std::process::exit(1);
            }
            None => Err(err),
        },
    }
}

fn run(signer: &LocalSigner, command: Commands) -> Result<Value> {
    match command {
        Commands::Sign { tx, key } => {
            let tx = load_transaction(&tx)?;
            let signed = signer.sign(&tx, &key.material()?)?;
            Ok(response::signed(&signed))
        }
        Commands::SignFor { tx, account, key } => {
            let tx = load_transaction(&tx)?;
            let account = AccountId::from_classic_address(&account)?;
            let multi = signer.sign_for(&tx, &key.material()?, account)?;
            Ok(response::multi_signed(&multi))
        }
        Commands::Combine { files } => combine_command(signer, &files),
        Commands::WalletPropose { seed, key_type } => {
            let proposal = signer.wallet_propose(&seed.input(), key_type)?;
            Ok(response::wallet(&proposal)?)
        }
        Commands::Decode { blob } => {
            let tx = decode_hex(&blob)?;
            let bytes = hex::decode(blob.trim()).context("invalid hex blob")?;
            Ok(response::decoded(&tx, &bytes))
        }
        Commands::Version => Err(anyhow!("version is handled before dispatch")),
    }
}

/// The first file supplies the transaction; every file contributes its signers
fn combine_command(signer: &LocalSigner, files: &[PathBuf]) -> Result<Value> {
    let mut base: Option<Transaction> = None;
    let mut entries: Vec<SignerEntry> = Vec::new();
    for file in files {
        let mut tx = load_transaction(file)?;
        entries.extend(localops_client::multisig::existing_signers(&tx)?);
        tx.remove("Signers");
        if base.is_none() {
            base = Some(tx);
        }
    }
    let base = base.ok_or_else(|| anyhow!("no transaction files given"))?;
    let signed = signer.combine(&base, &entries)?;
    Ok(response::signed(&signed))
}

fn version_command() -> Result<()> {
    println!("localops {}", env!("CARGO_PKG_VERSION"));
    println!("build: {}", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn setup_logging(config: &ClientConfig, log_level: Option<&str>) -> Result<()> {
    let level = log_level.unwrap_or(&config.log_level);
    let format: LogFormat = config.log_format.parse().map_err(|e: String| anyhow!(e))?;
    localops_log::init_tracing_with_level(level, format)
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

/// Accepts a bare transaction, `{"tx_json": ...}` or a full `{"result": {"tx_json": ...}}` response
fn load_transaction(path: &Path) -> Result<Transaction> {
    let text = read_input(path)?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let tx_json = value
        .pointer("/result/tx_json")
        .or_else(|| value.get("tx_json"))
        .unwrap_or(&value);
    Ok(transaction_from_json(tx_json)?)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
