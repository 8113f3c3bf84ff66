//! Configuration errors and grouped diagnostics.

use std::fmt;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use super::FieldPath;

/// Why a configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config file `{0}` not found")]
    NotFound(PathBuf),

    // No #[from]: a source() would print every diagnostic twice
    #[error("{0}")]
    Diagnostics(ConfigDiagnostics),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Deprecated option; loading continues.
    Warning,
    Error,
}

/// One finding about one option.
#[derive(Debug, Clone)]
pub struct ConfigDiagnostic {
    pub severity: Severity,
    pub field: FieldPath,
    pub message: String,
    pub hint: Option<String>,
}

impl fmt::Display for ConfigDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bullet = match self.severity {
            Severity::Error => "error".red().bold().to_string(),
            Severity::Warning => "warning".yellow().bold().to_string(),
        };
        write!(f, "{bullet} {}: {}", self.field, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n  {} {hint}", "hint:".cyan())?;
        }
        Ok(())
    }
}

/// Findings of every option, reported together after validation.
#[derive(Debug, Default)]
pub struct ConfigDiagnostics {
    items: Vec<ConfigDiagnostic>,
}

impl ConfigDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, field: FieldPath, message: String, hint: Option<String>) {
        self.items.push(ConfigDiagnostic {
            severity,
            field,
            message,
            hint,
        });
    }

    pub fn error(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Error, field, message.into(), None);
    }

    pub fn error_with_hint(
        &mut self,
        field: FieldPath,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.push(Severity::Error, field, message.into(), Some(hint.into()));
    }

    pub fn warn(&mut self, field: FieldPath, message: impl Into<String>) {
        self.push(Severity::Warning, field, message.into(), None);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn errors(&self) -> Vec<&ConfigDiagnostic> {
        self.of(Severity::Error).collect()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.of(Severity::Warning)
    }

    fn of(&self, severity: Severity) -> impl Iterator<Item = &ConfigDiagnostic> {
        self.items.iter().filter(move |d| d.severity == severity)
    }

    /// Log the warnings; errors are reported through [`into_result`](Self::into_result).
    pub fn print_warnings(&self) {
        let mut warnings = self.warnings().peekable();
        if warnings.peek().is_none() {
            return;
        }
        crate::log!("warn"; "deprecated config options, will be removed in a future version:");
        for warning in warnings {
            eprintln!("- {}: {}", warning.field.as_str(), warning.message);
        }
    }

    /// `Err(self)` when any error was recorded. Warnings alone pass.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() { Err(self) } else { Ok(()) }
    }
}

impl fmt::Display for ConfigDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let errors = self.errors();
        writeln!(f, "{}", "config validation failed:".red().bold())?;
        for error in &errors {
            write!(f, "\n{error}")?;
        }
        if errors.len() > 1 {
            write!(f, "\n\n{} errors", errors.len().to_string().red().bold())?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigDiagnostics {}
