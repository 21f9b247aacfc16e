//! Dataimport CLI - Import CSV files through writer plugins
//!
//! # Commands
//!
//! ```bash
//! dataimport import products.csv                      # JSON lines on stdout
//! dataimport import products.csv -o products.jsonl   # JSON lines to a file
//! dataimport import products.csv --offset 100 --limit 50 --preview 3
//! dataimport import --config import.json             # Settings from a file
//! dataimport count products.csv -d ';'               # Eligible data sets
//! ```
//!
//! A `.env` file is loaded first; `DATAIMPORT_LOG_LEVEL` controls console logs.

use clap::{Args, Parser, Subcommand};
use dataimport::logs::{log_info, log_info_indent};
use dataimport::{
    CsvReader, CsvReaderConfiguration, DataImporter, DataReader, DataSetWriter,
    DataSetWriterCollection, ImportConfiguration, JsonLinesWriter, PreviewWriter,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dataimport")]
#[command(about = "Import delimited files record by record", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file and write every data set as a JSON line
    Import {
        #[command(flatten)]
        reader: ReaderArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log the first N data sets
        #[arg(long)]
        preview: Option<usize>,

        /// Flush writers every N data sets
        #[arg(long)]
        flush_every: Option<usize>,
    },

    /// Count the data sets an import would read
    Count {
        #[command(flatten)]
        reader: ReaderArgs,
    },
}

/// Reader settings shared by all commands. Flags override the config file.
#[derive(Args)]
struct ReaderArgs {
    /// Input CSV file
    input: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Field delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Enclosure (quote) character
    #[arg(long)]
    enclosure: Option<char>,

    /// Escape character
    #[arg(long, conflicts_with = "no_escape")]
    escape: Option<char>,

    /// Disable escape character handling
    #[arg(long)]
    no_escape: bool,

    /// The first row is data, not column names
    #[arg(long)]
    no_header: bool,

    /// Trim whitespace around fields
    #[arg(long)]
    trim: bool,

    /// Skip this many data rows
    #[arg(long)]
    offset: Option<usize>,

    /// Read at most this many data sets
    #[arg(long)]
    limit: Option<usize>,

    /// Source encoding, e.g. windows-1252 (default: detected)
    #[arg(long)]
    encoding: Option<String>,
}

impl ReaderArgs {
    fn load(&self) -> Result<ImportConfiguration, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => ImportConfiguration::from_file(path)?,
            None => ImportConfiguration::default(),
        };
        config.reader = self.apply(config.reader);
        if config.reader.file_name.as_os_str().is_empty() {
            return Err("No input file given (argument or \"reader.fileName\" in config)".into());
        }
        Ok(config)
    }

    fn apply(&self, mut reader: CsvReaderConfiguration) -> CsvReaderConfiguration {
        if let Some(input) = &self.input {
            reader.file_name = input.clone();
        }
        if let Some(delimiter) = self.delimiter {
            reader.delimiter = delimiter;
        }
        if let Some(enclosure) = self.enclosure {
            reader.enclosure = enclosure;
        }
        if self.no_escape {
            reader.escape = None;
        } else if let Some(escape) = self.escape {
            reader.escape = Some(escape);
        }
        if self.no_header {
            reader.has_header = false;
        }
        if self.trim {
            reader.flags.trim = true;
        }
        if self.offset.is_some() {
            reader.offset = self.offset;
        }
        if self.limit.is_some() {
            reader.limit = self.limit;
        }
        if self.encoding.is_some() {
            reader.encoding = self.encoding.clone();
        }
        reader
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import {
            reader,
            output,
            preview,
            flush_every,
        } => cmd_import(&reader, output.as_deref(), preview, flush_every),

        Commands::Count { reader } => cmd_count(&reader),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_import(
    args: &ReaderArgs,
    output: Option<&Path>,
    preview: Option<usize>,
    flush_every: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = args.load()?;
    if let Some(output) = output {
        config.output = Some(output.to_path_buf());
    }
    if let Some(preview) = preview {
        config.preview_rows = preview;
    }
    if flush_every.is_some() {
        config.import.flush_every = flush_every;
    }

    log_info(format!("Importing {}", config.reader.file_name.display()));
    log_info_indent(format!("Delimiter: '{}'", format_delimiter(config.reader.delimiter)), 1);
    if let Some(offset) = config.reader.offset {
        log_info_indent(format!("Offset: {}", offset), 1);
    }
    if let Some(limit) = config.reader.limit {
        log_info_indent(format!("Limit: {}", limit), 1);
    }

    let reader = CsvReader::new(config.reader)?;

    let mut writers = DataSetWriterCollection::default();
    if config.preview_rows > 0 {
        writers.push(DataSetWriter::data_set(PreviewWriter::new(config.preview_rows)));
    }
    match &config.output {
        Some(path) => writers.push(DataSetWriter::item(JsonLinesWriter::create(path)?)),
        None => writers.push(DataSetWriter::item(JsonLinesWriter::stdout())),
    }

    let report = DataImporter::new(reader, writers, config.import).import()?;

    log_info_indent(format!("Run: {}", report.run_id), 1);
    log_info_indent(format!("Flushes: {}", report.flush_count), 1);
    log_info_indent(
        format!(
            "Duration: {} ms",
            (report.finished_at - report.started_at).num_milliseconds()
        ),
        1,
    );
    if let Some(path) = &config.output {
        log_info_indent(format!("Output: {}", path.display()), 1);
    }

    Ok(())
}

fn cmd_count(args: &ReaderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.load()?;
    let mut reader = CsvReader::new(config.reader)?;
    println!("{}", reader.count()?);
    Ok(())
}

fn format_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}
