use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;

mod emit;

/// Compile a regular expression into a scanner state-transition table.
#[derive(Debug, Parser)]
#[command(version, about)]
struct RelexArgs {
    /// The regex source; may contain several `$`-terminated rules
    regex: String,
    /// Print the DFA as a graphviz digraph instead of a table
    #[arg(long)]
    dot: bool,
    /// Skip the DFA minimization pass
    #[arg(long)]
    no_minimize: bool,
    /// Print the NFA state listing before the output artifact
    #[arg(long)]
    print_nfa: bool,
    /// Name of the emitted table array
    #[arg(long, default_value = "yy_next_state")]
    table_name: String,
    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum Error {
    #[error("{0}")]
    Parse(#[from] relex::ParseError),
    #[error("could not write output: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let args = RelexArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("relex: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RelexArgs) -> Result<(), Error> {
    let nfa = relex::regex::parse(&args.regex)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout().lock()),
    };

    if args.print_nfa {
        write!(out, "{nfa}")?;
    }

    let mut dfa = nfa.to_dfa();
    if !args.no_minimize {
        dfa.minimize();
    }

    if args.dot {
        out.write_all(dfa.to_dot().as_bytes())?;
    } else {
        emit::emit_table(&mut out, &dfa.to_table(), &args.table_name)?;
    }
    Ok(())
}
