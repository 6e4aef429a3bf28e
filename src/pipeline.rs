use std::io::{self, Write};

use crate::bytecode::disasm::disassemble;
use crate::bytecode::{Chunk, Compiler};
use crate::error::Error;
use crate::frontend::token_dumper::TokenDumper;
use crate::frontend::{Lexer, Parser};
use crate::runtime::Vm;
use crate::semantic::Analyzer;

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpretResult {
    Ok,
    ParseError,
    AnalyzeError,
    CompileError,
    RuntimeError,
}

impl InterpretResult {
    /// Process exit status (sysexits: 65 data error, 70 software error).
    pub fn exit_code(self) -> u8 {
        match self {
            InterpretResult::Ok => 0,
            InterpretResult::ParseError
            | InterpretResult::AnalyzeError
            | InterpretResult::CompileError => 65,
            InterpretResult::RuntimeError => 70,
        }
    }
}

/// Debugging views written to the output between stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Token stream, after lexing.
    pub tokens: bool,
    /// Typed tree, after semantic analysis.
    pub ast: bool,
    /// Disassembly, after compilation.
    pub bytecode: bool,
    /// ANSI colors in the token dump.
    pub color: bool,
}

/// Runs source text through every stage.
///
/// Program output and dumps go to `out`. A failing stage writes exactly one
/// diagnostic line to `err`.
pub struct Pipeline<O: Write, E: Write> {
    out: O,
    err: E,
    options: DumpOptions,
}

impl<O: Write, E: Write> Pipeline<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Pipeline {
            out,
            err,
            options: DumpOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DumpOptions) -> Self {
        self.options = options;
        self
    }

    /// Gives the writers back, e.g. to inspect captured output.
    pub fn into_writers(self) -> (O, E) {
        (self.out, self.err)
    }

    pub fn run(&mut self, source: &str) -> InterpretResult {
        let result = self.run_stages(source);
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "failed to flush output");
        }
        tracing::debug!(status = ?result, "pipeline finished");
        result
    }

    fn run_stages(&mut self, source: &str) -> InterpretResult {
        let chunk = match compile_stages(source, self.options, &mut self.out) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.report(&e.to_string());
                return e.status();
            }
        };

        let mut vm = Vm::new();
        match vm.run(&chunk, &mut self.out) {
            Ok(()) => InterpretResult::Ok,
            Err(e) => {
                let line = chunk
                    .line_at(e.offset())
                    .or_else(|| chunk.lines.last().copied())
                    .unwrap_or(0);
                self.report(&format!("[line {}] error: {}", line, e));
                InterpretResult::RuntimeError
            }
        }
    }

    fn report(&mut self, diagnostic: &str) {
        if let Err(e) = writeln!(self.err, "{}", diagnostic) {
            tracing::warn!(error = %e, "failed to write diagnostic");
        }
    }
}

/// Lexes, parses, analyzes and compiles `source`, writing the requested
/// dumps to `out` along the way.
fn compile_stages<W: Write>(source: &str, options: DumpOptions, out: &mut W) -> Result<Chunk, Error> {
    let tokens = Lexer::new(source).tokenize();
    tracing::debug!(tokens = tokens.len(), "lexed source");

    if options.tokens {
        let mut dumper = TokenDumper::new().pretty();
        if !options.color {
            dumper = dumper.no_color();
        }
        dump(out, |out| dumper.dump(&tokens, out));
    }

    let mut root = Parser::new(tokens).parse().map_err(Error::Parse)?;
    Analyzer::new().analyze(&mut root).map_err(Error::Analyze)?;

    if options.ast {
        dump(out, |out| write!(out, "{}", root));
    }

    let chunk = Compiler::new().compile_expression(&root)?;

    if options.bytecode {
        dump(out, |out| write!(out, "{}", disassemble(&chunk)));
    }

    Ok(chunk)
}

/// Dumps are best effort; a failed write is logged and the run goes on.
fn dump<W: Write>(out: &mut W, f: impl FnOnce(&mut W) -> io::Result<()>) {
    if let Err(e) = f(out) {
        tracing::warn!(error = %e, "failed to write dump");
    }
}

/// Compiles `source` to a chunk without running it.
pub fn compile_source(source: &str) -> Result<Chunk, Error> {
    compile_stages(source, DumpOptions::default(), &mut io::sink())
}

/// Runs `source` against stdout and stderr.
pub fn interpret(source: &str) -> InterpretResult {
    interpret_with(source, DumpOptions::default())
}

pub fn interpret_with(source: &str, options: DumpOptions) -> InterpretResult {
    Pipeline::new(io::stdout().lock(), io::stderr().lock())
        .with_options(options)
        .run(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::OpCode;

    fn run(source: &str, options: DumpOptions) -> (InterpretResult, String, String) {
        let mut pipeline = Pipeline::new(Vec::new(), Vec::new()).with_options(options);
        let result = pipeline.run(source);
        let (out, err) = pipeline.into_writers();
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(InterpretResult::Ok.exit_code(), 0);
        assert_eq!(InterpretResult::ParseError.exit_code(), 65);
        assert_eq!(InterpretResult::AnalyzeError.exit_code(), 65);
        assert_eq!(InterpretResult::CompileError.exit_code(), 65);
        assert_eq!(InterpretResult::RuntimeError.exit_code(), 70);
    }

    #[test]
    fn test_compile_source() {
        let chunk = compile_source("1 + 2").unwrap();
        assert_eq!(chunk.code.last(), Some(&(OpCode::Return as u8)));

        let err = compile_source("1 +").unwrap_err();
        assert_eq!(err.status(), InterpretResult::ParseError);
    }

    #[test]
    fn test_ast_dump_shows_inserted_cast() {
        let options = DumpOptions {
            ast: true,
            ..DumpOptions::default()
        };
        let (result, out, err) = run("1 + 2.0", options);
        assert_eq!(result, InterpretResult::Ok);
        assert!(err.is_empty());
        assert_eq!(
            out,
            "Binary: + (float)\n  Cast: float (float)\n    Literal: 1 (int)\n  Literal: 2.000000 (float)\n3.000000\n"
        );
    }

    #[test]
    fn test_token_dump() {
        let options = DumpOptions {
            tokens: true,
            ..DumpOptions::default()
        };
        let (result, out, _) = run("true", options);
        assert_eq!(result, InterpretResult::Ok);
        assert_eq!(out, "[01] BOOL     true\n[01] EOF     \ntrue\n");
    }

    #[test]
    fn test_bytecode_dump_precedes_output() {
        let options = DumpOptions {
            bytecode: true,
            ..DumpOptions::default()
        };
        let (_, out, _) = run("7", options);
        assert!(out.contains("BIPUSH      7"));
        assert!(out.ends_with("RETURN\n7\n"));
    }

    #[test]
    fn test_no_dumps_after_failed_stage() {
        let options = DumpOptions {
            tokens: false,
            ast: true,
            bytecode: true,
            color: false,
        };
        let (result, out, err) = run("!1", options);
        assert_eq!(result, InterpretResult::AnalyzeError);
        assert!(out.is_empty());
        assert_eq!(err, "[line 1] error: incompatible type for '!' operator\n");
    }

    #[test]
    fn test_runtime_error_line() {
        let (result, out, err) = run("1 +\n(2 /\n0)", DumpOptions::default());
        assert_eq!(result, InterpretResult::RuntimeError);
        assert!(out.is_empty());
        assert_eq!(err, "[line 2] error: division by zero\n");
    }
}
