//! learnware-cli: generate study content from the command line
//!
//! Usage:
//!   learnware-cli generate <kind> <subject> [topic] [--context <text>]
//!   learnware-cli key status
//!   learnware-cli key set <api-key>
//!   learnware-cli kinds

use anyhow::{bail, Context};
use learnware_grove::credentials::{CredentialChain, CredentialSource, CredentialState, KeyringStore};
use learnware_grove::{ContentGenerator, ContentKind, GenerationRequest, GeneratorConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]).await,
        "key" => cmd_key(&args[2..]),
        "kinds" => {
            for kind in ContentKind::ALL {
                let output = if kind.expects_json() { "json" } else { "text" };
                println!("{:<22} {}", kind.to_string(), output);
            }
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("learnware-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"learnware-cli: AI study content generator

USAGE:
    learnware-cli <COMMAND> [OPTIONS]

COMMANDS:
    generate <kind> <subject> [topic] [--context <text>]
                                Generate content and print it as JSON
    key status                  Show where the API key was found
    key set <api-key>           Store the API key in the OS keyring
    kinds                       List content kinds
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    GEMINI_API_KEY              API key fallback when the keyring has none
    LEARNWARE_MODEL             Model id (default gemini-1.5-flash)
    LEARNWARE_CACHE_TTL_SECS    Cache lifetime in seconds
    RUST_LOG                    Log filter"#
    );
}

/// Split positional arguments from `--context <text>`.
fn parse_generate_args(args: &[String]) -> anyhow::Result<(Vec<&str>, Option<&str>)> {
    let mut positional = Vec::new();
    let mut context = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--context" {
            let Some(value) = iter.next() else {
                bail!("--context needs a value");
            };
            context = Some(value.as_str());
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((positional, context))
}

async fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let (positional, context) = parse_generate_args(args)?;
    let (kind, subject, topic) = match positional.as_slice() {
        [kind, subject] => (*kind, *subject, None),
        [kind, subject, topic] => (*kind, *subject, Some(*topic)),
        _ => bail!("usage: learnware-cli generate <kind> <subject> [topic] [--context <text>]"),
    };
    let kind = ContentKind::parse(kind)
        .with_context(|| format!("unknown kind '{}', see `learnware-cli kinds`", kind))?;

    let mut request = GenerationRequest::new(kind, subject);
    if let Some(topic) = topic {
        request = request.with_topic(topic);
    }
    if let Some(context) = context {
        request = request.with_extra_context(context);
    }

    let generator = ContentGenerator::builder()
        .config(GeneratorConfig::from_env())
        .credentials(CredentialChain::standard())
        .build()?;

    match generator.generate(&request).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result.to_json())?);
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(2);
        }
    }
}

fn cmd_key(args: &[String]) -> anyhow::Result<()> {
    match args.first().map(String::as_str) {
        Some("status") => {
            match CredentialChain::standard().peek() {
                CredentialState::Configured { key, source } => {
                    println!("configured from {} ({:?})", source, key)
                }
                CredentialState::Unconfigured => println!("not configured"),
            }
            Ok(())
        }
        Some("set") => {
            let Some(raw) = args.get(1) else {
                bail!("usage: learnware-cli key set <api-key>");
            };
            let chain = CredentialChain::new().with_store(Arc::new(KeyringStore::default()));
            let generator = ContentGenerator::builder().credentials(chain).build()?;
            generator.set_api_key(raw)?;
            let stored = KeyringStore::default().fetch()?;
            println!("stored in keyring: {}", stored.is_some());
            Ok(())
        }
        _ => bail!("usage: learnware-cli key <status|set>"),
    }
}
