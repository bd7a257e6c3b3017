use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use starknet_abi_reflect::{ParserOptions, ResponseParser};
use starknet_abi_types::{Abi, CompiledContract};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "starknet-abi")]
#[command(about = "Starknet ABI toolchain - decode call responses and inspect ABI types")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the raw response of a function call into structured JSON
    Decode {
        /// ABI file (a bare ABI array or a compiled contract class)
        #[arg(short = 'f', long = "abi-file", required = true)]
        abi_file: PathBuf,

        /// Function whose outputs describe the response
        #[arg(short = 'm', long = "method", required = true)]
        method: String,

        /// JSON file holding the response tokens (an array, or an RPC reply with a "result" array)
        #[arg(short = 'r', long = "response-file", conflicts_with = "tokens")]
        response_file: Option<PathBuf>,

        /// Response tokens given inline, decimal or 0x-prefixed hex
        #[arg(value_name = "TOKEN")]
        tokens: Vec<String>,

        /// Pretty print JSON output
        #[arg(short = 'p', long = "pretty")]
        pretty: bool,

        /// Show only values (no kind tags)
        #[arg(short = 'v', long = "values-only")]
        values_only: bool,

        /// Fail when tokens remain after the last output
        #[arg(long = "strict")]
        strict: bool,

        /// Decode unrecognized type names as a single felt
        #[arg(long = "lenient-types")]
        lenient_types: bool,

        /// Maximum type nesting depth
        #[arg(long = "max-depth", value_name = "N")]
        max_depth: Option<usize>,
    },

    /// Show how type names are classified against an ABI
    Classify {
        /// ABI file (a bare ABI array or a compiled contract class)
        #[arg(short = 'f', long = "abi-file", required = true)]
        abi_file: PathBuf,

        /// Type names to classify
        #[arg(value_name = "TYPE", required = true)]
        type_names: Vec<String>,
    },

    /// List the callable functions of an ABI with their output types
    Functions {
        /// ABI file (a bare ABI array or a compiled contract class)
        #[arg(short = 'f', long = "abi-file", required = true)]
        abi_file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    /* Logs go to stderr so decoded JSON on stdout stays machine-readable */
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            abi_file,
            method,
            response_file,
            tokens,
            pretty,
            values_only,
            strict,
            lenient_types,
            max_depth,
        } => {
            let mut options = ParserOptions {
                strict,
                lenient_types,
                ..ParserOptions::default()
            };
            if let Some(max_depth) = max_depth {
                options.max_depth = max_depth;
            }
            let tokens = match response_file {
                Some(path) => load_tokens(&path)?,
                None => tokens,
            };
            run_decode(&abi_file, &method, &tokens, options, pretty, values_only)?;
        }

        Commands::Classify {
            abi_file,
            type_names,
        } => {
            run_classify(&abi_file, &type_names)?;
        }

        Commands::Functions { abi_file } => {
            run_functions(&abi_file)?;
        }
    }

    Ok(())
}

/* Both compiler artifacts and plain ABI arrays are accepted */
fn load_abi(path: &Path) -> anyhow::Result<Abi> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ABI file {}", path.display()))?;
    let abi = if json.trim_start().starts_with('{') {
        CompiledContract::from_json_str(&json)
            .with_context(|| format!("invalid compiled contract {}", path.display()))?
            .abi
    } else {
        Abi::from_json_str(&json).with_context(|| format!("invalid ABI {}", path.display()))?
    };
    debug!(path = %path.display(), items = abi.items.len(), "loaded ABI");
    Ok(abi)
}

fn load_tokens(path: &Path) -> anyhow::Result<Vec<String>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read response file {}", path.display()))?;
    let value: JsonValue = serde_json::from_str(&json)
        .with_context(|| format!("invalid response JSON {}", path.display()))?;
    tokens_from_json(&value)
}

fn tokens_from_json(value: &JsonValue) -> anyhow::Result<Vec<String>> {
    let items = match value {
        JsonValue::Array(items) => items,
        JsonValue::Object(map) => match map.get("result") {
            Some(JsonValue::Array(items)) => items,
            _ => anyhow::bail!("response object has no \"result\" array"),
        },
        _ => anyhow::bail!("response must be a JSON array of tokens"),
    };
    items
        .iter()
        .map(|item| match item {
            JsonValue::String(s) => Ok(s.clone()),
            JsonValue::Number(n) if n.is_u64() => Ok(n.to_string()),
            other => Err(anyhow::anyhow!("unsupported response token: {other}")),
        })
        .collect()
}

fn run_decode(
    abi_file: &Path,
    method: &str,
    tokens: &[String],
    options: ParserOptions,
    pretty: bool,
    values_only: bool,
) -> anyhow::Result<()> {
    let abi = load_abi(abi_file)?;
    let function = abi
        .function(method)
        .ok_or_else(|| anyhow::anyhow!("function '{method}' not found in {}", abi_file.display()))?;

    let structs = abi.structs();
    let enums = abi.enums();
    let parser = ResponseParser::with_options(&structs, &enums, options);
    let decoded = parser
        .parse_outputs(&function.outputs, tokens)
        .with_context(|| format!("failed to decode the response of '{method}'"))?;

    let output = if values_only {
        decoded.to_json()
    } else {
        serde_json::to_value(&decoded)?
    };
    if pretty {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string(&output)?);
    }

    Ok(())
}

fn run_classify(abi_file: &Path, type_names: &[String]) -> anyhow::Result<()> {
    let abi = load_abi(abi_file)?;
    let structs = abi.structs();
    let enums = abi.enums();
    let parser = ResponseParser::new(&structs, &enums);

    for type_name in type_names {
        match parser.classify(type_name) {
            Ok(category) => println!("{type_name}: {category}"),
            Err(e) => println!("{type_name}: error: {e}"),
        }
    }

    Ok(())
}

fn run_functions(abi_file: &Path) -> anyhow::Result<()> {
    let abi = load_abi(abi_file)?;

    for function in abi.functions() {
        let outputs: Vec<String> = function
            .outputs
            .iter()
            .map(|output| {
                if output.name.is_empty() {
                    output.type_name.clone()
                } else {
                    format!("{}: {}", output.name, output.type_name)
                }
            })
            .collect();
        let mutability = function.state_mutability.as_deref().unwrap_or("-");
        println!(
            "{} [{}] -> ({})",
            function.name,
            mutability,
            outputs.join(", ")
        );
    }

    Ok(())
}
