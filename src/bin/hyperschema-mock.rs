//! Hyper-Schema Mock CLI
//!
//! Command-line interface for resolving hyper-schema documents and serving
//! their link examples as a mock HTTP API.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hyperschema_mock::{
    compile_routes, load_document_auto, Diagnostic, RouteError, RouteTable, SchemaDocument,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hyperschema-mock")]
#[command(about = "Mock HTTP API generated from JSON Hyper-Schema link examples")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve every link of a schema as a mock endpoint
    #[cfg(feature = "server")]
    Serve {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Port to listen on
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: std::net::IpAddr,
    },

    /// Print the compiled route table as JSON
    Routes {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the schema with all links' $ref pointers resolved
    Resolve {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check that every link resolves and has a complete example
    Check {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hyperschema_mock=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        #[cfg(feature = "server")]
        Commands::Serve { schema, port, host } => run_serve(&schema, host, port),
        Commands::Routes {
            schema,
            output,
            pretty,
        } => run_routes(&schema, output, pretty),
        Commands::Resolve {
            schema,
            output,
            pretty,
        } => run_resolve(&schema, output, pretty),
        Commands::Check {
            schema,
            format,
            strict,
        } => run_check(&schema, format == "json", strict),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

/// Load and resolve a document, reporting failures on stderr.
fn load(source: &str) -> Result<SchemaDocument, u8> {
    let raw = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    SchemaDocument::load(&raw).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn compile(document: &SchemaDocument) -> Result<RouteTable, u8> {
    compile_routes(document).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

#[cfg(feature = "server")]
fn run_serve(source: &str, host: std::net::IpAddr, port: u16) -> Result<(), u8> {
    let document = load(source)?;
    let table = compile(&document)?;
    let router = hyperschema_mock::build_router(&table).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    for route in table.routes() {
        println!("  {:<7} {} -> {}", route.method, route.path, route.status);
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|e| {
        eprintln!("Error starting runtime: {}", e);
        3u8
    })?;

    let addr = std::net::SocketAddr::new(host, port);
    runtime
        .block_on(hyperschema_mock::serve(router, addr))
        .map_err(|e| {
            eprintln!("Error serving on {}: {}", addr, e);
            3u8
        })
}

fn run_routes(source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let document = load(source)?;
    let table = compile(&document)?;
    let json = if pretty {
        serde_json::to_string_pretty(table.routes())
    } else {
        serde_json::to_string(table.routes())
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    write_output(output, &json)
}

fn run_resolve(source: &str, output: Option<PathBuf>, pretty: bool) -> Result<(), u8> {
    let document = load(source)?;
    let resolved = document.to_value();
    let json = if pretty {
        serde_json::to_string_pretty(&resolved)
    } else {
        serde_json::to_string(&resolved)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;
    write_output(output, &json)
}

fn write_output(output: Option<PathBuf>, json: &str) -> Result<(), u8> {
    match output {
        Some(path) => std::fs::write(&path, json).map_err(|e| {
            eprintln!("Error writing to {}: {}", path.display(), e);
            3u8
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn run_check(source: &str, json_output: bool, strict: bool) -> Result<(), u8> {
    let compiled = load_quiet(source).and_then(|document| {
        let table = compile_routes(&document).map_err(route_failure)?;
        #[cfg(feature = "server")]
        hyperschema_mock::build_router(&table).map_err(route_failure)?;
        Ok((document, table))
    });

    let (document, table) = match compiled {
        Ok(compiled) => compiled,
        Err((message, code)) => {
            if json_output {
                println!("{}", serde_json::json!({ "valid": false, "error": message }));
            } else {
                eprintln!("Error: {}", message);
            }
            return Err(code);
        }
    };

    let diagnostics: Vec<&Diagnostic> = document
        .diagnostics()
        .iter()
        .chain(table.diagnostics())
        .collect();
    let passed = !strict || diagnostics.is_empty();

    if json_output {
        let output = serde_json::json!({
            "valid": passed,
            "routes": table.len(),
            "diagnostics": diagnostics,
        });
        println!("{}", output);
    } else {
        for diag in &diagnostics {
            println!("  warning[{}]: {} - {}", diag.code, diag.path, diag.message);
        }
        if diagnostics.is_empty() {
            println!("✓ {} routes compiled, no warnings", table.len());
        } else {
            println!(
                "{} {} routes compiled, {} warning(s)",
                if passed { "⚠" } else { "✗" },
                table.len(),
                diagnostics.len()
            );
        }
    }

    if passed {
        Ok(())
    } else {
        Err(1)
    }
}

fn route_failure(e: RouteError) -> (String, u8) {
    (e.to_string(), e.exit_code() as u8)
}

/// Like `load`, but hands the message back instead of printing it.
fn load_quiet(source: &str) -> Result<SchemaDocument, (String, u8)> {
    let raw = load_document_auto(source).map_err(|e| (e.to_string(), e.exit_code() as u8))?;
    SchemaDocument::load(&raw).map_err(|e| (e.to_string(), e.exit_code() as u8))
}
