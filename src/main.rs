use clap::{Parser as ClapParser, Subcommand};
use squiggly::{SquigglyParser, nodes_to_json};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "squiggly")]
#[command(about = "Squiggly - a field-selection filter compiler for JSON projection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a filter's syntax
    Check {
        /// The filter to check (reads from stdin if not provided)
        filter: Option<String>,
    },

    /// Compile a filter and print its node tree as JSON
    Ast {
        /// The filter to compile (reads from stdin if not provided)
        filter: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { filter } => run_check(filter),
        Commands::Ast { filter, pretty } => run_ast(filter, pretty),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(filter: Option<String>) -> Result<(), String> {
    let filter = read_filter(filter)?;
    SquigglyParser::new()
        .parse(&filter)
        .map_err(|e| e.to_string())?;
    println!("Syntax is valid");
    Ok(())
}

fn run_ast(filter: Option<String>, pretty: bool) -> Result<(), String> {
    let filter = read_filter(filter)?;
    let nodes = SquigglyParser::new()
        .parse(&filter)
        .map_err(|e| e.to_string())?;

    let rendered = nodes_to_json(&nodes);
    let json = if pretty {
        serde_json::to_string_pretty(&rendered)
    } else {
        serde_json::to_string(&rendered)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn read_filter(filter: Option<String>) -> Result<String, String> {
    match filter {
        Some(filter) => Ok(filter),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| e.to_string())?;
            Ok(buffer)
        }
        None => Err("no filter given: pass one as an argument or pipe it on stdin".to_string()),
    }
}
