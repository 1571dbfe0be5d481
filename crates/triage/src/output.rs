//! Structured output formatting for CLI commands.
//!
//! Provides consistent JSON output for both success and error cases, so the
//! CLI stays machine-readable for automation and agents driving triage runs.

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::io::{self, Write};

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    /// Create a new output context
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print success message (suppressed by --quiet or --json)
    pub fn print_success(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print error (always shown to stderr)
    pub fn print_error(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe_stderr(&format!("Error: {}", msg))
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Silently exit on broken pipe (expected when piping to head, etc.)
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Safe eprintln that handles broken pipes gracefully
fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    /// Create a new successful output with the given data
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    /// Create a new error output
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            metadata: Metadata::new(command),
        }
    }

    /// Attach structured details to the error
    pub fn with_details(mut self, details: Value) -> Self {
        self.error.details = Some(details);
        self
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self.error.code.as_str() {
            "CONFIG_INVALID" => ExitCode::ValidationFailed,
            "NOT_FOUND" | "COLLECTION_NOT_FOUND" => ExitCode::NotFound,
            "INVALID_ARGUMENT" => ExitCode::InvalidArgument,
            "IO_ERROR" => ExitCode::ExternalError,
            _ => ExitCode::GenericError,
        }
    }
}

/// Error details including code and message
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "CONFIG_INVALID", "COLLECTION_NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Metadata attached to every JSON envelope
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Output format version
    pub version: String,
    /// Command that produced this output
    pub command: String,
    /// When the output was produced
    pub timestamp: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Standardized exit codes for the triage CLI
///
/// These codes follow Unix conventions and provide consistent error
/// reporting for automation and scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,
    /// Generic error (1)
    GenericError = 1,
    /// Invalid arguments or usage error (2)
    InvalidArgument = 2,
    /// Resource not found - file, collection, rule (3)
    NotFound = 3,
    /// Configuration validation failed (4)
    ValidationFailed = 4,
    /// External dependency failed - file system, codec (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}
