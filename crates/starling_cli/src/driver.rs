use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use starling_frontend::ast::Module;
use starling_frontend::token::Token;
use starling_frontend::{ParserConfig, SyntaxError};
use starling_interner::Interner;
use starling_session::diagnostics::DiagnosticEmitter;
use starling_session::sourcemap::{Source, SourceId, SourceMap};
use starling_session::{ErrorsEmitted, Session};

/// Parsing recurses once per nesting level, so parser threads get more stack
/// than the platform default.
const PARSER_STACK_SIZE: usize = 16 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("couldn't read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("couldn't serialize output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("couldn't start parser threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("aborting due to {0} previous error(s)")]
    HadErrors(usize),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// The outcome of parsing one source.
#[derive(Debug)]
pub struct ParsedFile {
    pub source_id: SourceId,
    pub module: Module,
    pub errors: Vec<SyntaxError>,
}

/// Owns everything shared between the files of one invocation.
pub struct Driver<D: DiagnosticEmitter> {
    pub session: Session<D>,
    pub interner: Interner,
    pub config: ParserConfig,
}

impl<D: DiagnosticEmitter> Driver<D> {
    pub fn new(diagnostics: D) -> Self {
        Self {
            session: Session::new(diagnostics),
            interner: Interner::new(),
            config: ParserConfig::default(),
        }
    }

    /// Registers an input. If `is_source` is set the input is the source text
    /// itself, otherwise it is read from the path it names.
    pub fn add_input(&mut self, input: &str, is_source: bool) -> DriverResult<SourceId> {
        let source = if is_source {
            Source::new("<input>", input)
        } else {
            let text = std::fs::read_to_string(input).map_err(|source| DriverError::Read {
                path: input.into(),
                source,
            })?;
            Source::with_path(input, input, text)
        };

        Ok(self.session.sources.insert(source))
    }

    pub fn source_name(&self, id: SourceId) -> &str {
        self.session
            .sources
            .get(id)
            .map_or("<unknown>", |source| source.as_source().name.as_str())
    }

    /// Lexes a source, reporting any errors. The returned tokens end with
    /// end of file.
    pub fn lex(&mut self, id: SourceId) -> Vec<Token> {
        let text = source_text(&self.session.sources, id);
        let (tokens, errors) = starling_frontend::lex(text, &self.interner);
        // Counted by the session, checked in `finish`.
        let _ = self.report(id, errors.into_iter().map(SyntaxError::Lexer));
        tokens
    }

    /// Parses every source on a pool of `jobs` threads, or one per CPU.
    /// Results come back in the order of `ids`.
    pub fn parse_all(
        &self,
        ids: &[SourceId],
        jobs: Option<NonZeroUsize>,
    ) -> DriverResult<Vec<ParsedFile>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.map_or(0, NonZeroUsize::get))
            .stack_size(PARSER_STACK_SIZE)
            .thread_name(|index| format!("parser-{index}"))
            .build()?;

        let sources = &self.session.sources;
        let interner = &self.interner;
        let config = self.config;

        log::debug!(
            "parsing {} file(s) on {} thread(s)",
            ids.len(),
            pool.current_num_threads()
        );

        Ok(pool.install(|| {
            ids.par_iter()
                .map(|&id| parse_file(sources, interner, config, id))
                .collect()
        }))
    }

    pub fn report(
        &mut self,
        id: SourceId,
        errors: impl IntoIterator<Item = SyntaxError>,
    ) -> Result<(), ErrorsEmitted> {
        self.session.report_all(errors, &id)
    }

    /// Fails if anything reported so far was an error.
    pub fn finish(&self) -> DriverResult<()> {
        match self.session.error_count() {
            0 => Ok(()),
            count => Err(DriverError::HadErrors(count)),
        }
    }
}

fn source_text(sources: &SourceMap, id: SourceId) -> &str {
    sources.get(id).map_or("", |source| source.as_source().text.as_str())
}

fn parse_file(
    sources: &SourceMap,
    interner: &Interner,
    config: ParserConfig,
    id: SourceId,
) -> ParsedFile {
    let start = Instant::now();
    let text = source_text(sources, id);
    let (module, errors) = starling_frontend::parse_with_config(text, interner, config);

    log::debug!(
        "parsed {:?} in {:?} with {} error(s)",
        id,
        start.elapsed(),
        errors.len()
    );

    ParsedFile {
        source_id: id,
        module,
        errors,
    }
}
