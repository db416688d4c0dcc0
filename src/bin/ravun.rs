use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use ravun::{
    analyzer,
    ast::Program,
    lexer::Lexer,
    parser,
    value::ValueKind,
    Interpreter, RavunError, Repl,
};

#[derive(Parser)]
#[command(author, version, about = "Ravun language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Ravun script file
    Run { script: PathBuf },
    /// Check a script without running it
    Check {
        script: PathBuf,
        /// Print the token stream
        #[arg(long)]
        tokens: bool,
        /// Print the parsed syntax tree
        #[arg(long)]
        ast: bool,
    },
    /// Evaluate a snippet of Ravun code
    Eval { source: String },
    /// Start an interactive REPL session
    Repl,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let result = match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => run_script(script),
        Command::Check {
            script,
            tokens,
            ast,
        } => check_script(script, tokens, ast),
        Command::Eval { source } => eval_snippet(&source),
        Command::Repl => {
            let mut repl = Repl::new();
            repl.run().map(|()| true)
        }
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_script(path: PathBuf) -> Result<bool, RavunError> {
    let extension = path.extension().and_then(|ext| ext.to_str());
    if !matches!(extension, Some("ravun" | "rv")) {
        eprintln!(
            "error: `{}` is not a Ravun script (expected a .ravun or .rv file)",
            path.display()
        );
        return Ok(false);
    }
    let source = fs::read_to_string(&path)?;
    let program = match frontend(&source) {
        Some(program) => program,
        None => return Ok(false),
    };
    log::debug!("running {}", path.display());
    let mut interpreter = Interpreter::new();
    match interpreter.run_program(&program) {
        Ok(_) => Ok(true),
        Err(RavunError::Diagnostic(diag)) => {
            eprintln!("{}", diag.render(&source));
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

fn check_script(path: PathBuf, tokens: bool, ast: bool) -> Result<bool, RavunError> {
    let source = fs::read_to_string(&path)?;
    if tokens {
        match Lexer::new(&source).tokenize() {
            Ok(stream) => {
                for token in &stream {
                    println!("{token:?}");
                }
            }
            Err(diag) => {
                eprintln!("{}", diag.render(&source));
                return Ok(false);
            }
        }
    }
    let program = match frontend(&source) {
        Some(program) => program,
        None => return Ok(false),
    };
    if ast {
        println!("{program:#?}");
    }
    Ok(true)
}

fn eval_snippet(source: &str) -> Result<bool, RavunError> {
    let mut interpreter = Interpreter::new();
    match interpreter.eval_source(source) {
        Ok(value) => {
            if !matches!(&*value.0, ValueKind::Unit) {
                println!("{value}");
            }
            Ok(true)
        }
        Err(RavunError::Diagnostic(diag)) => {
            eprintln!("{}", diag.render(source));
            Ok(false)
        }
        Err(RavunError::Compile(diags)) => {
            for diag in &diags {
                eprintln!("{}", diag.render(source));
            }
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Parse and analyze, printing every diagnostic. Returns the program
/// when there were no hard errors; warnings alone do not fail.
fn frontend(source: &str) -> Option<Program> {
    log::debug!("parsing {} bytes", source.len());
    let program = match parser::parse_program(source) {
        Ok(program) => program,
        Err(diags) => {
            for diag in &diags {
                eprintln!("{}", diag.render(source));
            }
            return None;
        }
    };
    log::debug!("analyzing {} top-level items", program.items.len());
    let diags = analyzer::analyze(&program);
    let mut failed = false;
    for diag in &diags {
        eprintln!("{}", diag.render(source));
        failed |= !diag.is_warning();
    }
    if failed {
        None
    } else {
        Some(program)
    }
}
