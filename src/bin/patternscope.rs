use anyhow::Context;
use clap::Parser;
use patternscope::config::ConfigFile;
use patternscope::finder::DEFAULT_TOKEN_CACHE_CAPACITY;
use patternscope::{
    analyze_partitioned, AnalysisOpts, InputRow, NoopRowAnnotationFactory, PatternFinderResult,
    RowAnnotationFactory, TokenizerConfiguration,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};

fn init_parallelism() {
    static START: Once = Once::new();
    START.call_once(|| {
        let n = num_cpus::get();
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    });
}

#[derive(Parser, Debug)]
#[command(name = "patternscope", version, about = "Discover the string patterns of a column of values")]
struct Cli {
    /// Input files (`-` for stdin). May be repeated.
    #[arg(required = false)]
    input: Vec<String>,

    /// JSON tokenizer configuration; flags below override it
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Split lines on this character and analyze one field (no quoting support)
    #[arg(long = "delimiter")]
    delimiter: Option<char>,
    /// Zero-based index of the analyzed field (with --delimiter)
    #[arg(long = "column", default_value_t = 0)]
    column: usize,
    /// Zero-based index of the field to group patterns by (with --delimiter)
    #[arg(long = "group-column")]
    group_column: Option<usize>,
    /// First line holds field names
    #[arg(long = "header", default_value_t = false)]
    header: bool,

    #[arg(long = "no-text-case", default_value_t = false)] no_text_case: bool,
    #[arg(long = "negative-numbers", default_value_t = false)] negative_numbers: bool,
    #[arg(long = "no-decimals", default_value_t = false)] no_decimals: bool,
    #[arg(long = "no-mixed", default_value_t = false)] no_mixed: bool,
    #[arg(long = "ignore-repeated-spaces", default_value_t = false)] ignore_repeated_spaces: bool,
    #[arg(long = "upper-case-expandable", default_value_t = false)] upper_case_expandable: bool,
    #[arg(long = "lower-case-fixed", default_value_t = false)] lower_case_fixed: bool,
    #[arg(long = "decimal-separator")] decimal_separator: Option<char>,
    #[arg(long = "thousands-separator")] thousands_separator: Option<char>,
    #[arg(long = "minus-sign")] minus_sign: Option<char>,

    /// Predefined token as NAME=REGEX. Repeating a name adds regexes in order.
    #[arg(long = "token")]
    tokens: Vec<String>,
    /// Built-in predefined token: EMAIL | URL | TIMESTAMP | UUID | IPV6 | IPV4 | HEX
    #[arg(long = "builtin")]
    builtins: Vec<String>,

    /// Number of partitions analyzed in parallel (default: CPU count)
    #[arg(long = "partitions")]
    partitions: Option<usize>,
    /// Token cache entries per group (0 disables)
    #[arg(long = "cache-size", default_value_t = DEFAULT_TOKEN_CACHE_CAPACITY)]
    cache_size: usize,
    /// Stop after this many values
    #[arg(long = "limit")]
    limit: Option<usize>,

    /// Output format: json | table
    #[arg(long = "format", default_value = "json")]
    format: String,
    /// Keep only the N most frequent patterns per group in the output
    #[arg(long = "top")]
    top: Option<usize>,
}

fn build_config(cli: &Cli) -> anyhow::Result<TokenizerConfiguration> {
    let mut builder = TokenizerConfiguration::builder();
    if let Some(path) = &cli.config {
        let file = ConfigFile::from_path(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        builder = file.apply(builder)?;
    }
    if cli.no_text_case { builder = builder.discriminate_text_case(false); }
    if cli.negative_numbers { builder = builder.discriminate_negative_numbers(true); }
    if cli.no_decimals { builder = builder.discriminate_decimals(false); }
    if cli.no_mixed { builder = builder.enable_mixed_tokens(false); }
    if cli.ignore_repeated_spaces { builder = builder.ignore_repeated_spaces(true); }
    if cli.upper_case_expandable { builder = builder.upper_case_expandable(true); }
    if cli.lower_case_fixed { builder = builder.lower_case_expandable(false); }
    if let Some(c) = cli.decimal_separator { builder = builder.decimal_separator(Some(c)); }
    if let Some(c) = cli.thousands_separator { builder = builder.thousands_separator(Some(c)); }
    if let Some(c) = cli.minus_sign { builder = builder.minus_sign(Some(c)); }
    for name in &cli.builtins {
        builder = builder.builtin_token(name.clone());
    }

    let mut tokens: Vec<(String, Vec<String>)> = Vec::new();
    for spec in &cli.tokens {
        let (name, regex) = spec
            .split_once('=')
            .with_context(|| format!("--token expects NAME=REGEX, got '{spec}'"))?;
        match tokens.iter_mut().find(|(n, _)| n == name) {
            Some((_, regexes)) => regexes.push(regex.to_string()),
            None => tokens.push((name.to_string(), vec![regex.to_string()])),
        }
    }
    for (name, regexes) in tokens {
        builder = builder.predefined_token(name, regexes);
    }
    Ok(builder.build()?)
}

struct RowReader<'a> {
    cli: &'a Cli,
    rows: Vec<InputRow>,
    column_name: String,
    group_name: Option<String>,
    header_pending: bool,
}

impl<'a> RowReader<'a> {
    fn new(cli: &'a Cli) -> Self {
        let (column_name, group_name) = match cli.delimiter {
            Some(_) => (
                format!("field {}", cli.column),
                cli.group_column.map(|g| format!("field {g}")),
            ),
            None => ("value".to_string(), None),
        };
        Self {
            cli,
            rows: Vec::new(),
            column_name,
            group_name,
            header_pending: cli.header,
        }
    }

    fn full(&self) -> bool {
        self.cli.limit.map_or(false, |limit| self.rows.len() >= limit)
    }

    fn push_line(&mut self, line: &str) {
        let Some(delimiter) = self.cli.delimiter else {
            let id = self.rows.len() as u64;
            self.rows.push(InputRow::new(id, Some(line)));
            return;
        };
        let fields: Vec<&str> = line.split(delimiter).collect();
        if self.header_pending {
            self.header_pending = false;
            if let Some(name) = fields.get(self.cli.column) {
                self.column_name = name.to_string();
            }
            if let Some(g) = self.cli.group_column {
                self.group_name = Some(fields.get(g).map_or_else(|| format!("field {g}"), |s| s.to_string()));
            }
            return;
        }
        let id = self.rows.len() as u64;
        let value = fields.get(self.cli.column).copied();
        let group = self.cli.group_column.and_then(|g| fields.get(g).copied());
        self.rows.push(InputRow::new(id, value).with_group(group));
    }

    fn read_source<R: BufRead>(&mut self, reader: R, running: &AtomicBool) -> io::Result<()> {
        for line in reader.lines() {
            if !running.load(Ordering::SeqCst) || self.full() {
                break;
            }
            let line = line?;
            self.push_line(line.trim_end_matches('\r'));
        }
        Ok(())
    }
}

fn print_table(result: &PatternFinderResult, top: Option<usize>) {
    for (group, crosstab) in result.groups() {
        if result.is_grouped() {
            println!("\n# {}", group.unwrap_or("<null>"));
        }
        println!("{:<8} {:<32} {}", "Count", "Pattern", "Sample");
        for row in crosstab.rows().iter().take(top.unwrap_or(usize::MAX)) {
            println!("{:<8} {:<32} {}", row.match_count(), row.symbolic(), row.sample());
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_parallelism();
    patternscope::telemetry::init_tracing();
    let cli = Cli::parse();

    let config = Arc::new(build_config(&cli)?);

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        let _ = ctrlc::set_handler(move || { r.store(false, Ordering::SeqCst); });
    }

    let input_files = if cli.input.is_empty() {
        vec!["-".to_string()]
    } else {
        cli.input.clone()
    };
    if input_files.iter().any(|p| p == "-") && atty::is(atty::Stream::Stdin) {
        eprintln!("reading values from stdin, one per line (Ctrl-D to finish)");
    }

    let mut reader = RowReader::new(&cli);
    for p in &input_files {
        if p == "-" {
            let stdin = io::stdin();
            reader.read_source(stdin.lock(), &running)?;
        } else {
            let f = File::open(p).with_context(|| format!("opening {p}"))?;
            reader.read_source(BufReader::with_capacity(1 << 20, f), &running)?;
        }
    }

    let opts = AnalysisOpts {
        column: reader.column_name.clone(),
        group_column: reader.group_name.clone(),
        partitions: cli.partitions.unwrap_or_else(num_cpus::get),
        cache_capacity: cli.cache_size,
    };
    let annotations: Arc<dyn RowAnnotationFactory> = Arc::new(NoopRowAnnotationFactory::default());
    let result = analyze_partitioned(&reader.rows, &opts, config, annotations)?;

    if cli.format == "table" {
        print_table(&result, cli.top);
        return Ok(());
    }
    let mut out = result.to_output();
    if let Some(top) = cli.top {
        for group in &mut out.groups {
            group.patterns.truncate(top);
        }
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
