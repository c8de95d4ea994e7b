//! xlfmt - Excel formula beautifier

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use formula_beautifier::{
    format_with, sanitize_formula, tokenize, try_format, validate_formula, FormatOptions,
};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "xlfmt")]
#[command(author, version, about = "Indent and line-break Excel formulas")]
struct Cli {
    /// Log more detail to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Beautify formulas and print the result
    #[command(alias = "fmt")]
    Format {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        style: StyleArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a JSON report instead of plain text
        #[arg(long)]
        json: bool,

        /// Fail on formulas that cannot be parsed instead of echoing them
        #[arg(long)]
        strict: bool,
    },

    /// Report formulas the formatter cannot parse (exit 1 if any)
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Maximum nesting depth accepted by the parser
        #[arg(long, default_value = "64")]
        max_depth: usize,
    },

    /// Dump the tokens of a formula
    Tokens {
        /// Formula text
        formula: String,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Formula text (default: read from --file or stdin)
    formula: Option<String>,

    /// File with one formula per line
    #[arg(short, long, conflicts_with = "formula")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct StyleArgs {
    /// Spaces per indentation level
    #[arg(long, default_value = "4")]
    indent: usize,

    /// Indent with tabs instead of spaces
    #[arg(long)]
    tabs: bool,

    /// Line width past which any call is broken over several lines
    #[arg(short, long, default_value = "80")]
    width: usize,

    /// Maximum nesting depth accepted by the parser
    #[arg(long, default_value = "64")]
    max_depth: usize,

    /// Additional function to print one argument per line (repeatable)
    #[arg(long = "function", value_name = "NAME")]
    functions: Vec<String>,
}

impl StyleArgs {
    fn to_options(&self) -> FormatOptions {
        let options = if self.tabs {
            FormatOptions::default().with_indent("\t")
        } else {
            FormatOptions::default().with_indent_size(self.indent)
        };

        self.functions.iter().fold(
            options
                .with_max_line_width(self.width)
                .with_max_depth(self.max_depth),
            |options, name| options.with_multiline_function(name),
        )
    }
}

/// One formatted formula, field names matching the web API
#[derive(Debug, Serialize, PartialEq)]
struct FormulaReport {
    original_formula: String,
    beautified_formula: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Format {
            input,
            style,
            output,
            json,
            strict,
        } => format_formulas(&input, &style.to_options(), output.as_deref(), json, strict),
        Commands::Check { input, max_depth } => check_formulas(&input, max_depth),
        Commands::Tokens { formula } => show_tokens(&formula),
    }
}

/// `-v` flags win over `RUST_LOG`; without either only warnings are shown
fn log_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn init_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(verbose))
        .init();
}

/// Collect the formulas named by the input arguments
fn read_formulas(input: &InputArgs) -> Result<Vec<String>> {
    if let Some(formula) = &input.formula {
        return Ok(vec![formula.clone()]);
    }

    let content = match &input.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read '{}'", path.display()))?,
        None => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read from stdin")?;
            content
        }
    };

    Ok(split_formulas(&content))
}

/// One formula per non-blank line
fn split_formulas(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Request-layer handling of a single formula: sanitize, validate, format
fn beautify(raw: &str, options: &FormatOptions, strict: bool) -> Result<FormulaReport> {
    let formula = sanitize_formula(raw);
    validate_formula(&formula).with_context(|| format!("Rejected formula '{}'", raw.trim()))?;

    let beautified_formula = if strict {
        try_format(&formula, options)
            .with_context(|| format!("Failed to parse '{formula}'"))?
    } else {
        format_with(&formula, options)
    };

    Ok(FormulaReport {
        original_formula: formula,
        beautified_formula,
    })
}

fn format_formulas(
    input: &InputArgs,
    options: &FormatOptions,
    output: Option<&Path>,
    json: bool,
    strict: bool,
) -> Result<()> {
    let reports = read_formulas(input)?
        .iter()
        .map(|formula| beautify(formula, options, strict))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = reports.len(), "formatted formulas");

    let rendered = if json {
        let mut text = if reports.len() == 1 {
            serde_json::to_string_pretty(&reports[0])
        } else {
            serde_json::to_string_pretty(&reports)
        }
        .context("Failed to serialize report")?;
        text.push('\n');
        text
    } else {
        reports
            .iter()
            .map(|report| format!("{}\n", report.beautified_formula))
            .collect::<Vec<_>>()
            .join("\n")
    };

    if let Some(output_path) = output {
        std::fs::write(output_path, &rendered)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote {} formula(s) to '{}'",
            reports.len(),
            output_path.display()
        );
    } else {
        io::stdout()
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn check_formulas(input: &InputArgs, max_depth: usize) -> Result<()> {
    let options = FormatOptions::default().with_max_depth(max_depth);
    let formulas = read_formulas(input)?;
    let mut failures = 0;

    for formula in &formulas {
        let formula = sanitize_formula(formula);
        let outcome = validate_formula(&formula)
            .map_err(anyhow::Error::from)
            .and_then(|()| try_format(&formula, &options).map_err(anyhow::Error::from));

        if let Err(err) = outcome {
            failures += 1;
            println!("{formula}\n    {err}");
        }
    }

    if failures > 0 {
        bail!("{failures} of {} formula(s) cannot be formatted", formulas.len());
    }

    eprintln!("{} formula(s) OK", formulas.len());
    Ok(())
}

fn show_tokens(formula: &str) -> Result<()> {
    let tokens = tokenize(formula).with_context(|| format!("Failed to tokenize '{formula}'"))?;

    for token in tokens {
        println!("{:>5}  {:<12} {}", token.offset, format!("{:?}", token.kind), token.text);
    }

    Ok(())
}
