//! papercrypt: printable, checksummed backups of small secrets
//!
//! Commands:
//!   generate      - seal a secret into a printable document (text or JSON)
//!   decode        - parse a document and recover the secret
//!   verify        - parse a document and report metadata and checksums
//!   phrase        - print a BIP-39 passphrase
//!   config show   - display the effective configuration
//!
//! Documents and plaintext go to stdout (or `-o`); logs and warnings go to
//! stderr.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::{ExposeSecret, SecretString};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use papercrypt_codec::{
    parse_any, DataFormat, Document, HeaderStyle, HexCase, Metadata, ParsedDocument,
    RenderOptions,
};
use papercrypt_core::{ParsePolicy, PapercryptConfig};
use papercrypt_crypto::{generate_passphrase, KdfParams, PassphraseCipher};

const PASSPHRASE_ENV: &str = "PAPERCRYPT_PASSPHRASE";

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "papercrypt",
    version,
    about = "Printable encrypted backups",
    long_about = "papercrypt: seal small secrets into checksummed documents that survive printing and retyping"
)]
struct Cli {
    /// Path to papercrypt.toml configuration file
    #[arg(long, short = 'c', env = "PAPERCRYPT_CONFIG", default_value = "papercrypt.toml")]
    config: PathBuf,

    /// Log level filter (overrides config)
    #[arg(long, env = "PAPERCRYPT_LOG")]
    log: Option<String>,

    /// Log format (overrides config)
    #[arg(long, env = "PAPERCRYPT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Report checksum mismatches as warnings instead of failing
    #[arg(long, global = true)]
    ignore_checksums: bool,

    /// Read documents with a missing or unsupported version as the current format
    #[arg(long, global = true)]
    ignore_version: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Seal a secret into a new document
    ///
    /// The passphrase is read from PAPERCRYPT_PASSPHRASE, or prompted for twice.
    Generate {
        /// Secret to seal (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Where to write the document (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Serial number (default: random)
        #[arg(long)]
        serial: Option<String>,
        /// What the document protects
        #[arg(long, default_value = "")]
        purpose: String,
        /// Free-form note printed in the header
        #[arg(long, default_value = "")]
        comment: String,
        /// Store the secret compressed but unencrypted
        #[arg(long)]
        raw: bool,
        /// Write the compact JSON form
        #[arg(long)]
        json: bool,
        /// Lowercase hex digits (overrides config)
        #[arg(long)]
        lowercase: bool,
        /// Prefix every header line with "# " (overrides config)
        #[arg(long)]
        commented_header: bool,
    },

    /// Parse a document (text or JSON) and recover the secret
    Decode {
        /// Document to read (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
        /// Where to write the secret (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Check a document without decrypting it
    Verify {
        /// Document to read (default: stdin)
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,
    },

    /// Print a new BIP-39 passphrase
    Phrase {
        /// Number of words: 12, 15, 18, 21 or 24 (default: from config)
        #[arg(long)]
        words: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = PapercryptConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    let level = cli.log.clone().unwrap_or_else(|| config.log.level.clone());
    let format = match &cli.log_format {
        Some(format) => format.clone(),
        None => LogFormat::from_str(&config.log.format, true)
            .map_err(|e| anyhow::anyhow!("invalid log format in config: {e}"))?,
    };
    init_logging(&level, &format);

    let policy = ParsePolicy {
        ignore_checksum_mismatch: cli.ignore_checksums || config.parse.ignore_checksum_mismatch,
        ignore_version_mismatch: cli.ignore_version || config.parse.ignore_version_mismatch,
    };

    match cli.command {
        Commands::Generate {
            input,
            output,
            serial,
            purpose,
            comment,
            raw,
            json,
            lowercase,
            commented_header,
        } => {
            let mut options = RenderOptions {
                hex_case: config.render.hex_case,
                header_style: config.render.header_style,
            };
            if lowercase {
                options.hex_case = HexCase::Lower;
            }
            if commented_header {
                options.header_style = HeaderStyle::Commented;
            }
            let mut metadata = Metadata::now(purpose, comment);
            if let Some(serial) = serial {
                metadata.serial_number = serial;
            }
            cmd_generate(
                &config,
                input.as_deref(),
                output.as_deref(),
                metadata,
                raw,
                json,
                &options,
            )
        }
        Commands::Decode { input, output } => {
            cmd_decode(&config, &policy, input.as_deref(), output.as_deref())
        }
        Commands::Verify { input } => cmd_verify(&policy, input.as_deref()),
        Commands::Phrase { words } => {
            cmd_phrase(words.unwrap_or(config.crypto.passphrase_words))
        }
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── I/O helpers ───────────────────────────────────────────────────────────────

fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, data: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data).context("writing stdout")?;
            stdout.flush().context("flushing stdout")
        }
    }
}

fn cipher_from_config(config: &PapercryptConfig) -> PassphraseCipher {
    PassphraseCipher::new(KdfParams {
        mem_cost_kib: config.crypto.argon2_mem_cost_kib,
        time_cost: config.crypto.argon2_time_cost,
        parallelism: config.crypto.argon2_parallelism,
    })
}

/// Passphrase from PAPERCRYPT_PASSPHRASE, else an interactive prompt.
fn read_passphrase(confirm: bool) -> Result<SecretString> {
    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        debug!("using passphrase from {PASSPHRASE_ENV}");
        return Ok(SecretString::from(value));
    }

    let first = SecretString::from(
        rpassword::prompt_password("Passphrase: ").context("reading passphrase")?,
    );
    if first.expose_secret().is_empty() {
        anyhow::bail!("passphrase must not be empty");
    }
    if confirm {
        let second = SecretString::from(
            rpassword::prompt_password("Repeat passphrase: ").context("reading passphrase")?,
        );
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passphrases do not match");
        }
    }
    Ok(first)
}

fn parse_input(policy: &ParsePolicy, input: Option<&Path>) -> Result<ParsedDocument> {
    let data = read_input(input)?;
    let parsed = parse_any(&data, policy).context("parsing document")?;

    for warning in &parsed.warnings {
        warn!(class = ?warning.error().class(), "{warning}");
    }
    if let Some(version) = &parsed.upgraded_from {
        info!(from = %version, "read legacy document");
    }
    Ok(parsed)
}

// ── `papercrypt generate` ─────────────────────────────────────────────────────

fn cmd_generate(
    config: &PapercryptConfig,
    input: Option<&Path>,
    output: Option<&Path>,
    metadata: Metadata,
    raw: bool,
    json: bool,
    options: &RenderOptions,
) -> Result<()> {
    let plaintext = read_input(input)?;

    let document = if raw {
        Document::seal_raw(&plaintext, metadata).context("sealing document")?
    } else {
        let passphrase = read_passphrase(true)?;
        Document::seal(&cipher_from_config(config), &passphrase, &plaintext, metadata)
            .context("sealing document")?
    };

    info!(
        serial = %document.serial_number(),
        format = %document.data_format(),
        payload_bytes = document.payload().len(),
        "document generated"
    );

    let rendered = if json {
        document.to_json().context("serializing document to JSON")?
    } else {
        document.to_text(options).into_bytes()
    };
    write_output(output, &rendered)
}

// ── `papercrypt decode` ───────────────────────────────────────────────────────

fn cmd_decode(
    config: &PapercryptConfig,
    policy: &ParsePolicy,
    input: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let parsed = parse_input(policy, input)?;
    let document = &parsed.document;

    let passphrase = match document.data_format() {
        DataFormat::Pgp => Some(read_passphrase(false)?),
        DataFormat::Raw => None,
    };
    let plaintext = document
        .decode(&cipher_from_config(config), passphrase.as_ref())
        .context("decoding document")?;

    info!(serial = %document.serial_number(), bytes = plaintext.len(), "document decoded");
    write_output(output, &plaintext)
}

// ── `papercrypt verify` ───────────────────────────────────────────────────────

fn cmd_verify(policy: &ParsePolicy, input: Option<&Path>) -> Result<()> {
    let parsed = parse_input(policy, input)?;
    let doc = &parsed.document;

    println!("Serial:       {}", doc.serial_number());
    println!("Purpose:      {}", doc.purpose());
    println!("Comment:      {}", doc.comment());
    println!("Created:      {}", papercrypt_codec::format_timestamp(doc.created_at()));
    println!("Version:      {}", doc.format_version());
    if let Some(version) = &parsed.upgraded_from {
        println!("Upgraded:     from {version}");
    }
    println!("Data format:  {}", doc.data_format());
    println!("Length:       {} bytes", doc.payload().len());
    println!("CRC-24:       {:06X}", doc.payload_crc24());
    println!("CRC-32:       {:08X}", doc.payload_crc32());
    println!("SHA-256:      {}", BASE64.encode(doc.payload_sha256()));

    if parsed.warnings.is_empty() {
        println!("Status:       OK");
    } else {
        println!("Status:       {} warning(s)", parsed.warnings.len());
        for warning in &parsed.warnings {
            println!("  - {warning}");
        }
    }
    Ok(())
}

// ── `papercrypt phrase` ───────────────────────────────────────────────────────

fn cmd_phrase(words: usize) -> Result<()> {
    let phrase = generate_passphrase(words).context("generating passphrase")?;
    println!("{}", phrase.expose_secret());
    Ok(())
}

// ── `papercrypt config show` ──────────────────────────────────────────────────

fn cmd_config_show(config: &PapercryptConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = config.to_toml().context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
