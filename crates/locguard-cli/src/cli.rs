//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "locguard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Trusted project root (default: current directory)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Append security events as JSON lines to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub audit_log: Option<PathBuf>,

    /// Rotate the audit log once it grows past this size
    #[arg(long, global = true, default_value = "10M", value_parser = parse_byte_size)]
    pub audit_log_max_size: u64,

    /// Number of rotated audit logs to keep
    #[arg(long, global = true, default_value = "5")]
    pub audit_log_keep: usize,

    /// Diagnostic log level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Log level from `--log-level`, falling back to the verbosity flags.
    pub fn effective_log_level(&self) -> &str {
        match &self.log_level {
            Some(level) => level,
            None if self.verbose => "debug",
            None if self.quiet => "error",
            None => "warn",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate paths against the project root without touching them
    Check(CheckArgs),
    /// Print a file from inside the project root
    Read(ReadArgs),
    /// Atomically write stdin to a file inside the project root
    Write(WriteArgs),
    /// List a directory inside the project root
    Ls(LsArgs),
    /// Create a directory inside the project root
    Mkdir(MkdirArgs),
    /// Delete a file, link or directory inside the project root
    Rm(PathArgs),
    /// Show metadata for a path inside the project root
    Stat(PathArgs),
    /// Strip script-injection constructs from free text
    Sanitize(SanitizeArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Candidate paths, relative to the project root
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<String>,

    /// Accept absolute paths spelled against the resolved project root
    #[arg(long)]
    pub allow_absolute: bool,

    /// Allowed file extension (can be repeated)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Create missing parent directories of accepted paths
    #[arg(long)]
    pub create: bool,
}

#[derive(clap::Args)]
pub struct ReadArgs {
    /// File path, relative to the project root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Allowed file extension (can be repeated)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,
}

#[derive(clap::Args)]
pub struct WriteArgs {
    /// File path, relative to the project root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Fail instead of creating missing parent directories
    #[arg(long)]
    pub no_create_parents: bool,
}

#[derive(clap::Args)]
pub struct LsArgs {
    /// Directory path, relative to the project root
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: String,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Restrict listing to these top-level directories (can be repeated)
    #[arg(long = "allow-subdir", value_name = "NAME")]
    pub allowed_subdirs: Vec<String>,

    /// Drop entries whose symlinks point outside the project root
    #[arg(long)]
    pub verify_links: bool,
}

#[derive(clap::Args)]
pub struct MkdirArgs {
    /// Directory path, relative to the project root
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Create missing parent directories
    #[arg(short, long)]
    pub parents: bool,
}

#[derive(clap::Args)]
pub struct PathArgs {
    /// Path, relative to the project root
    #[arg(value_name = "PATH")]
    pub path: String,
}

#[derive(clap::Args)]
pub struct SanitizeArgs {
    /// Text to sanitize (reads stdin when omitted)
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Truncate the result to this many characters
    #[arg(long)]
    pub max_length: Option<usize>,

    /// Keep ordinary HTML tags
    #[arg(long)]
    pub keep_tags: bool,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Parse byte size with optional suffix (K, M, G, T)
#[allow(clippy::option_if_let_else)]
fn parse_byte_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty byte size".to_string());
    }

    let (num_str, multiplier) = if let Some(stripped) = s.strip_suffix('T') {
        (stripped, 1024_u64.pow(4))
    } else if let Some(stripped) = s.strip_suffix('G') {
        (stripped, 1024_u64.pow(3))
    } else if let Some(stripped) = s.strip_suffix('M') {
        (stripped, 1024_u64.pow(2))
    } else if let Some(stripped) = s.strip_suffix('K') {
        (stripped, 1024)
    } else {
        (s, 1)
    };

    num_str
        .parse::<u64>()
        .map_err(|_| format!("invalid byte size: {s}"))
        .and_then(|n| {
            n.checked_mul(multiplier)
                .ok_or_else(|| format!("byte size overflow: {s}"))
        })
}
