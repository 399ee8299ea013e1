//! Tokenize command implementation

use crate::commands::load_rules;
use crate::config::CliConfig;
use crate::error::CliError;
use crate::input::{resolve_patterns, FileReader};
use crate::output::{JsonFormatter, MarkdownFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rayon::prelude::*;
use segrules_api::{ApiError, Config, Input, Output, Segmenter};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Arguments for the tokenize command
#[derive(Debug, Args)]
pub struct TokenizeArgs {
    /// Compiled rule table
    #[arg(short, long, value_name = "FILE")]
    pub rules: PathBuf,

    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tokens requested per engine call
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Stop each input after N tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<usize>,

    /// Show offsets and flags next to each token
    #[arg(long)]
    pub flags: bool,

    /// Tokenize input files in parallel
    #[arg(short, long)]
    pub parallel: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text with one token per line
    Text,
    /// JSON array of inputs with their tokens
    Json,
    /// Markdown formatted output
    Markdown,
}

impl TokenizeArgs {
    /// Execute the tokenize command
    pub fn execute(&self) -> Result<()> {
        self.init_logging();

        log::info!("Starting tokenization");
        log::debug!("Arguments: {:?}", self);

        let config = CliConfig::load_or_default(self.config.as_deref())?;
        let format = self.resolve_format(&config)?;
        let show_flags = self.flags || config.output.show_flags;

        let segmenter = Segmenter::new(load_rules(&self.rules)?)
            .with_config(self.api_config(&config)?)
            .map_err(config_error)?;

        let files = resolve_patterns(&self.input)?;
        log::info!("Found {} file(s) to tokenize", files.len());

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(files.len() as u64);

        let parallel = (self.parallel || config.performance.parallel_files) && files.len() > 1;
        let results = if parallel {
            tokenize_parallel(
                &segmenter,
                &files,
                &progress,
                config.performance.worker_threads,
            )?
        } else {
            files
                .iter()
                .map(|path| tokenize_file(&segmenter, path, &progress))
                .collect::<Result<Vec<_>>>()?
        };
        progress.finish();

        let mut formatter = self.create_formatter(
            format,
            show_flags,
            config.output.pretty_json,
            results.len() > 1,
        )?;
        for (path, output) in &results {
            formatter.begin_input(&path.display().to_string())?;
            for token in &output.tokens {
                formatter.format_token(token)?;
            }
        }
        formatter.finish()?;

        let total: usize = results.iter().map(|(_, o)| o.metadata.token_count).sum();
        log::info!("Tokenized {} file(s), {} token(s)", results.len(), total);

        Ok(())
    }

    /// Merge command-line overrides into the file configuration
    fn api_config(&self, config: &CliConfig) -> Result<Config> {
        Config::builder()
            .batch_size(self.batch_size.unwrap_or(config.tokenize.batch_size))
            .max_tokens(self.max_tokens.or(config.tokenize.max_tokens))
            .include_text(config.tokenize.include_text)
            .build()
            .map_err(config_error)
    }

    fn resolve_format(&self, config: &CliConfig) -> Result<OutputFormat> {
        if let Some(format) = self.format {
            return Ok(format);
        }
        <OutputFormat as ValueEnum>::from_str(&config.output.default_format, true).map_err(|_| {
            CliError::ConfigError(format!(
                "unknown output format: {}",
                config.output.default_format
            ))
            .into()
        })
    }

    fn create_formatter(
        &self,
        format: OutputFormat,
        show_flags: bool,
        pretty_json: bool,
        headers: bool,
    ) -> Result<Box<dyn OutputFormatter>> {
        let writer: Box<dyn Write + Send + Sync> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
                format!("Failed to create output file: {}", path.display())
            })?)),
            None => Box::new(io::stdout()),
        };

        Ok(match format {
            OutputFormat::Text => {
                Box::new(TextFormatter::new(writer, show_flags).with_headers(headers))
            }
            OutputFormat::Json => Box::new(JsonFormatter::new(writer, pretty_json)),
            OutputFormat::Markdown => Box::new(MarkdownFormatter::new(writer, show_flags)),
        })
    }

    /// Initialize logging based on verbosity level
    fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }
}

fn config_error(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Config(msg) => CliError::ConfigError(msg).into(),
        other => other.into(),
    }
}

fn tokenize_file(
    segmenter: &Segmenter,
    path: &Path,
    progress: &ProgressReporter,
) -> Result<(PathBuf, Output)> {
    let text = FileReader::read_text(path)?;
    log::debug!("Tokenizing {} ({} bytes)", path.display(), text.len());

    let output = segmenter
        .process(Input::from_text(text))
        .with_context(|| format!("Failed to tokenize {}", path.display()))?;
    if output.metadata.truncated {
        log::warn!(
            "{}: stopped after {} tokens",
            path.display(),
            output.metadata.token_count
        );
    }

    progress.file_completed(&path.display().to_string());
    Ok((path.to_path_buf(), output))
}

fn tokenize_parallel(
    segmenter: &Segmenter,
    files: &[PathBuf],
    progress: &ProgressReporter,
    worker_threads: usize,
) -> Result<Vec<(PathBuf, Output)>> {
    let run = || {
        files
            .par_iter()
            .map(|path| tokenize_file(segmenter, path, progress))
            .collect::<Result<Vec<_>>>()
    };

    if worker_threads > 0 {
        log::debug!("Using {} worker thread(s)", worker_threads);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .build()
            .context("Failed to build worker pool")?;
        pool.install(run)
    } else {
        run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segrules_core::{RuleTableBuilder, StateSpec};
    use tempfile::TempDir;

    fn args(rules: PathBuf, input: Vec<String>) -> TokenizeArgs {
        TokenizeArgs {
            rules,
            input,
            output: None,
            format: None,
            config: None,
            batch_size: None,
            max_tokens: None,
            flags: false,
            parallel: false,
            quiet: true,
            verbose: 0,
        }
    }

    fn write_rules(dir: &Path) -> PathBuf {
        let mut b = RuleTableBuilder::new(2);
        b.categories_mut()
            .set_range('a' as u32, 'z' as u32, 1)
            .unwrap();
        b.add_state(StateSpec::new(vec![0, 0]));
        b.add_state(StateSpec::new(vec![3, 2]));
        b.add_state(StateSpec::accepting(vec![0, 2]));
        b.add_state(StateSpec::accepting(vec![0, 0]));
        let path = dir.join("words.brk");
        std::fs::write(&path, b.build().unwrap()).unwrap();
        path
    }

    #[test]
    fn test_command_line_overrides_config() {
        let mut config = CliConfig::default();
        config.tokenize.batch_size = 16;
        config.tokenize.max_tokens = Some(5);
        config.tokenize.include_text = false;

        let mut a = args(PathBuf::from("r.brk"), vec![]);
        a.batch_size = Some(2);
        let api = a.api_config(&config).unwrap();
        assert_eq!(api.batch_size, 2);
        assert_eq!(api.max_tokens, Some(5));
        assert!(!api.include_text);

        a.batch_size = Some(0);
        let err = a.api_config(&config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CliError>(),
            Some(CliError::ConfigError(_))
        ));
    }

    #[test]
    fn test_format_falls_back_to_config() {
        let mut config = CliConfig::default();
        config.output.default_format = "JSON".to_string();
        let mut a = args(PathBuf::from("r.brk"), vec![]);
        assert_eq!(a.resolve_format(&config).unwrap(), OutputFormat::Json);

        a.format = Some(OutputFormat::Markdown);
        assert_eq!(a.resolve_format(&config).unwrap(), OutputFormat::Markdown);

        config.output.default_format = "yaml".to_string();
        a.format = None;
        assert!(a.resolve_format(&config).is_err());
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let rules = write_rules(dir.path());
        let input = dir.path().join("in.txt");
        std::fs::write(&input, "hi there").unwrap();
        let out = dir.path().join("out.txt");

        let mut a = args(rules, vec![input.display().to_string()]);
        a.output = Some(out.clone());
        a.execute().unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "hi\n \nthere\n");
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        let rules = write_rules(dir.path());
        for (name, text) in [("a.txt", "one two"), ("b.txt", "x y z"), ("c.txt", "")] {
            std::fs::write(dir.path().join(name), text).unwrap();
        }
        let pattern = format!("{}/*.txt", dir.path().display());

        let run = |parallel: bool, out: &str| {
            let out = dir.path().join(out);
            let mut a = args(rules.clone(), vec![pattern.clone()]);
            a.parallel = parallel;
            a.format = Some(OutputFormat::Json);
            a.output = Some(out.clone());
            a.execute().unwrap();
            std::fs::read_to_string(out).unwrap()
        };

        assert_eq!(run(true, "par.json"), run(false, "seq.json"));
    }
}
