use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::{RavunError, Result},
    runtime::Interpreter,
};

/// Interactive session. Each line is evaluated against one persistent
/// interpreter, so bindings survive between prompts.
pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(editor_error)?;
        println!(
            "ravun {} (:quit to leave)",
            env!("CARGO_PKG_VERSION")
        );
        loop {
            let line = match editor.readline(">> ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => return Err(editor_error(err)),
            };
            let snippet = line.trim();
            if snippet.is_empty() {
                continue;
            }
            if snippet == ":quit" || snippet == ":exit" {
                break;
            }
            editor.add_history_entry(snippet).ok();
            self.eval_line(snippet);
        }
        Ok(())
    }

    fn eval_line(&mut self, snippet: &str) {
        match self.interpreter.eval_source(snippet) {
            Ok(value) => println!("{value}"),
            Err(RavunError::Compile(diags)) => {
                for diag in diags {
                    eprintln!("{diag}");
                }
            }
            Err(RavunError::Diagnostic(diag)) => eprintln!("{diag}"),
            Err(other) => eprintln!("error: {other}"),
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn editor_error(err: ReadlineError) -> RavunError {
    RavunError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
}
