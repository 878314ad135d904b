pub mod cli;
pub mod driver;

use std::io::Write;

use cli::{Cli, Command, OutputFormat, ParseOptions};
use driver::{Driver, DriverResult, ParsedFile};
use serde::Serialize;
use starling_frontend::ast::{Expr, Function, Item, Module};
use starling_frontend::visit::{self, Visitor};
use starling_frontend::token::{Token, TokenKind};
use starling_frontend::{ParserConfig, SyntaxError};
use starling_interner::Interner;
use starling_session::diagnostics::{DiagnosticEmitter, PrettyDiagnosticEmitter};

/// Runs a command, printing diagnostics to stderr and results to `out`.
pub fn run(cli: Cli, out: &mut impl Write) -> DriverResult<()> {
    let mut driver = Driver::new(PrettyDiagnosticEmitter::new(cli.color.into()));
    execute(cli.command, &mut driver, out)
}

pub fn execute<D: DiagnosticEmitter>(
    command: Command,
    driver: &mut Driver<D>,
    out: &mut impl Write,
) -> DriverResult<()> {
    match command {
        Command::Lex {
            input,
            source,
            format,
        } => {
            let id = driver.add_input(&input, source)?;
            let tokens = driver.lex(id);

            match format {
                OutputFormat::Debug => {
                    for token in &tokens {
                        writeln!(
                            out,
                            "{}..{}\t{}",
                            token.span.start,
                            token.span.end,
                            describe(token, &driver.interner)
                        )?;
                    }
                }
                OutputFormat::Json => {
                    let output = LexOutput {
                        strings: driver.interner.strings(),
                        tokens: &tokens,
                    };
                    serde_json::to_writer_pretty(&mut *out, &output)?;
                    writeln!(out)?;
                }
            }
        }

        Command::Parse {
            inputs,
            source,
            format,
            options,
        } => {
            let files = parse_inputs(driver, &inputs, source, options)?;

            match format {
                OutputFormat::Debug => {
                    for file in &files {
                        writeln!(out, "// {}", driver.source_name(file.source_id))?;
                        writeln!(out, "{:#?}", file.module)?;
                    }
                }
                OutputFormat::Json => {
                    let output = ParseOutput {
                        strings: driver.interner.strings(),
                        files: files
                            .iter()
                            .map(|file| FileOutput {
                                name: driver.source_name(file.source_id),
                                module: &file.module,
                                errors: &file.errors,
                            })
                            .collect(),
                    };
                    serde_json::to_writer_pretty(&mut *out, &output)?;
                    writeln!(out)?;
                }
            }

            report_files(driver, files);
        }

        Command::Check {
            inputs,
            source,
            options,
        } => {
            let files = parse_inputs(driver, &inputs, source, options)?;
            let count = files.len();

            for file in &files {
                let mut counts = NodeCounts::default();
                counts.visit_module(&file.module);
                log::debug!(
                    "{}: {} items, {} functions, {} expressions",
                    driver.source_name(file.source_id),
                    counts.items,
                    counts.functions,
                    counts.exprs
                );
            }

            report_files(driver, files);

            if driver.session.error_count() == 0 {
                writeln!(out, "checked {count} file(s)")?;
            }
        }
    }

    driver.finish()
}

fn parse_inputs<D: DiagnosticEmitter>(
    driver: &mut Driver<D>,
    inputs: &[String],
    is_source: bool,
    options: ParseOptions,
) -> DriverResult<Vec<ParsedFile>> {
    driver.config = ParserConfig {
        max_errors: options.max_errors,
        max_nesting: options.max_nesting,
    };

    let ids = inputs
        .iter()
        .map(|input| driver.add_input(input, is_source))
        .collect::<DriverResult<Vec<_>>>()?;

    driver.parse_all(&ids, options.jobs)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct NodeCounts {
    items: usize,
    functions: usize,
    exprs: usize,
}

impl<'ast> Visitor<'ast> for NodeCounts {
    fn visit_item(&mut self, item: &'ast Item) {
        self.items += 1;
        visit::walk_item(self, item);
    }

    /// Methods included.
    fn visit_function(&mut self, function: &'ast Function) {
        self.functions += 1;
        visit::walk_function(self, function);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        self.exprs += 1;
        visit::walk_expr(self, expr);
    }
}

fn report_files<D: DiagnosticEmitter>(driver: &mut Driver<D>, files: Vec<ParsedFile>) {
    for file in files {
        // Counted by the session, checked in `finish`.
        let _ = driver.report(file.source_id, file.errors);
    }
}

fn describe(token: &Token, interner: &Interner) -> String {
    match token.kind {
        TokenKind::Identifier(name) => format!("identifier `{}`", &interner[name]),
        TokenKind::String(value) => format!("string {:?}", &interner[value]),
        TokenKind::Integer(Some(value)) => format!("integer {value}"),
        TokenKind::Float(value) => format!("float {}", value.get()),
        TokenKind::Char(value) => format!("char {value:?}"),
        TokenKind::Bool(value) => format!("bool {value}"),
        kind => kind.to_string(),
    }
}

/// Interned strings are serialized as numbers; `strings` maps them back (the
/// string for number `n` is at index `n - 1`).
#[derive(Serialize)]
struct LexOutput<'a> {
    strings: Vec<&'a str>,
    tokens: &'a [Token],
}

#[derive(Serialize)]
struct ParseOutput<'a> {
    strings: Vec<&'a str>,
    files: Vec<FileOutput<'a>>,
}

#[derive(Serialize)]
struct FileOutput<'a> {
    name: &'a str,
    module: &'a Module,
    errors: &'a [SyntaxError],
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use starling_interner::Interner;

    use super::*;

    #[test]
    fn counts_nodes() {
        let interner = Interner::new();
        let (module, errors) = starling_frontend::parse(
            "interface Show { fun show(self): i32; }\nfun f() { g(1 + 2); }",
            &interner,
        );
        assert_eq!(errors, vec![]);

        let mut counts = NodeCounts::default();
        counts.visit_module(&module);
        assert_eq!(
            counts,
            NodeCounts {
                items: 2,
                functions: 2,
                exprs: 5,
            }
        );
    }
}
