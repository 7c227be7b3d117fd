use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Import student rosters from spreadsheets, CSV, or JSON", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Ingest a batch of student rows into a store file
    Import(ImportArgs),
    /// Dry run: map, normalize, and validate rows without touching a store
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Input file (.xlsx, .xls, .ods, .csv, .tsv, or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Store file to import into (created when missing)
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// Treat key collisions as failures instead of skipping them
    #[arg(long = "fail-duplicates")]
    pub fail_duplicates: bool,
    /// Write the full outcome report as JSON to this path
    #[arg(long = "report-json")]
    pub report_json: Option<PathBuf>,
    /// Delimiter character for CSV input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Input file (.xlsx, .xls, .ods, .csv, .tsv, or .json)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Delimiter character for CSV input (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_delimiters() {
        assert_eq!(parse_delimiter("tab").unwrap(), b'\t');
        assert_eq!(parse_delimiter(";").unwrap(), b';');
        assert!(parse_delimiter("ab").is_err());
    }
}
