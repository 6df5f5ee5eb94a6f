//! Mathex CLI - parse, simplify and render math expressions

#[cfg(feature = "cli")]
use clap::{Parser, ValueEnum};
#[cfg(feature = "cli")]
use mathex::{
    process, to_structured_json, EngineConfig, MathResult, MathexResult, NumericSetting,
    SimplifyMode, SmallAsZero, Syntax,
};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "mathex")]
#[command(version)]
#[command(about = "Mathex - symbolic expression engine for text and LaTeX math", long_about = None)]
struct Cli {
    /// Expression to process (reads --file or stdin if not provided)
    expression: Option<String>,

    /// Read the expression from a file
    #[arg(short, long)]
    file: Option<String>,

    /// Input is LaTeX rather than plain text
    #[arg(short, long)]
    latex: bool,

    /// JSON configuration file; flags below override its fields
    #[arg(short, long)]
    config: Option<String>,

    /// Simplification mode
    #[arg(short, long, value_enum)]
    simplify: Option<Mode>,

    /// Multiply out products and powers of sums
    #[arg(short = 'x', long)]
    expand: bool,

    /// Keep multi-letter identifiers whole
    #[arg(long)]
    no_split_symbols: bool,

    /// Symbols that are functions when followed by parentheses (comma separated)
    #[arg(long, value_delimiter = ',')]
    function_symbols: Vec<String>,

    /// Read parenthesized tuples as vectors
    #[arg(long)]
    create_vectors: bool,

    /// Read mismatched brackets as intervals
    #[arg(long)]
    create_intervals: bool,

    /// Mark sums, products and sets as unordered
    #[arg(long)]
    unordered: bool,

    /// Read `1.5E3` as scientific notation
    #[arg(long)]
    parse_scientific_notation: bool,

    /// Round numbers to this many significant digits
    #[arg(long)]
    digits: Option<usize>,

    /// Round numbers to this many decimal places (wins over --digits)
    #[arg(long)]
    decimals: Option<usize>,

    /// Pad rounded numbers with trailing zeros
    #[arg(long)]
    pad_zeros: bool,

    /// Display magnitudes below 1e-14 as zero
    #[arg(long)]
    small_as_zero: bool,

    /// Show unfilled positions as underscores
    #[arg(long)]
    display_blanks: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Output::Latex)]
    output: Output,

    /// Pretty print the structured tree
    #[arg(short, long)]
    pretty: bool,
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    None,
    Numbers,
    Numberspreserveorder,
    Full,
}

#[cfg(feature = "cli")]
impl From<Mode> for SimplifyMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::None => SimplifyMode::None,
            Mode::Numbers => SimplifyMode::Numbers,
            Mode::Numberspreserveorder => SimplifyMode::NumbersPreserveOrder,
            Mode::Full => SimplifyMode::Full,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Clone, Copy, PartialEq, ValueEnum)]
enum Output {
    Latex,
    Text,
    Tree,
    All,
}

#[cfg(feature = "cli")]
impl Cli {
    fn engine_config(&self) -> MathexResult<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::from_json(&fs::read_to_string(path)?)?,
            None => EngineConfig::default(),
        };
        if let Some(mode) = self.simplify {
            config.simplify = mode.into();
        }
        config.expand |= self.expand;
        if self.no_split_symbols {
            config.split_symbols = false;
        }
        config
            .function_symbols
            .extend(self.function_symbols.iter().cloned());
        config.create_vectors |= self.create_vectors;
        config.create_intervals |= self.create_intervals;
        config.unordered |= self.unordered;
        config.parse_scientific_notation |= self.parse_scientific_notation;
        if let Some(digits) = self.digits {
            config.display_digits = Some(NumericSetting::from(digits));
        }
        if let Some(decimals) = self.decimals {
            config.display_decimals = Some(NumericSetting::from(decimals));
        }
        config.pad_zeros |= self.pad_zeros;
        if self.small_as_zero {
            config.display_small_as_zero = SmallAsZero::Flag(true);
        }
        config.display_blanks |= self.display_blanks;
        Ok(config)
    }

    fn read_input(&self) -> io::Result<String> {
        if let Some(expression) = &self.expression {
            return Ok(expression.clone());
        }
        match &self.file {
            Some(path) => fs::read_to_string(path),
            None => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok(buffer)
            }
        }
    }
}

#[cfg(feature = "cli")]
fn print_result(result: &MathResult, output: Output, pretty: bool) -> MathexResult<()> {
    match output {
        Output::Latex => println!("{}", result.latex),
        Output::Text => println!("{}", result.text),
        Output::Tree => println!("{}", to_structured_json(&result.processed, pretty)?),
        Output::All => {
            println!("latex: {}", result.latex);
            println!("text:  {}", result.text);
            println!("tree:  {}", to_structured_json(&result.processed, pretty)?);
        }
    }
    for issue in &result.issues {
        eprintln!("warning: {} (at {})", issue.message, issue.offset);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn run(cli: &Cli) -> MathexResult<()> {
    let config = cli.engine_config()?;
    let input = cli.read_input()?;
    let syntax = if cli.latex { Syntax::Latex } else { Syntax::Text };
    let result = process(input.trim(), syntax, &config);
    print_result(&result, cli.output, cli.pretty)
}

#[cfg(feature = "cli")]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install mathex --features cli");
    eprintln!("  mathex [OPTIONS] [EXPRESSION]");
}
