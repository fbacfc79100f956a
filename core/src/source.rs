use std::process::Command;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::FetchError;
use crate::model::reading::MAX_COUNT;

static DOWNLOAD_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"download_count:\s+(\d+)").unwrap());

/// Something that can tell us today's cumulative download count.
pub trait ReadingSource {
    fn fetch(&self) -> Result<u64, FetchError>;
}

/// Asks Ansible Galaxy through `ansible-galaxy role info <role>`.
#[derive(Debug, Clone)]
pub struct GalaxySource {
    program: String,
    role: String,
}

impl GalaxySource {
    pub fn new(program: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            role: role.into(),
        }
    }

    fn command_line(&self) -> String {
        format!("{} role info {}", self.program, self.role)
    }
}

impl ReadingSource for GalaxySource {
    fn fetch(&self) -> Result<u64, FetchError> {
        let output = Command::new(&self.program)
            .args(["role", "info", &self.role])
            .output()
            .map_err(|source| FetchError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(FetchError::Command {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_download_count(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Extracts the `download_count:` field of `ansible-galaxy role info` output.
pub fn parse_download_count(output: &str) -> Result<u64, FetchError> {
    let captures = DOWNLOAD_COUNT_RE
        .captures(output)
        .ok_or_else(|| FetchError::CountMissing {
            output: output.trim().to_string(),
        })?;
    let digits = &captures[1];
    digits
        .parse::<u64>()
        .ok()
        .filter(|count| *count <= MAX_COUNT)
        .ok_or_else(|| FetchError::InvalidCount(digits.to_string()))
}
