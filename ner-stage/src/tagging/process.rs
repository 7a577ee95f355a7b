//! Tagger backend that runs an external program over a temporary input file.
//!
//! The default configuration targets SENNA (`senna -usrtokens -ner`), which
//! reads pre-tokenised text from stdin and prints one word per line followed
//! by its label columns.

use super::{NerBackend, TaggedWord, TaggingResult, TextBlock, ToolError};
use crate::config::{InputMode, TaggerConfig};
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs a configured tagger program once per block.
#[derive(Debug, Clone)]
pub struct ProcessTagger {
    config: TaggerConfig,
    name: String,
}

impl ProcessTagger {
    /// Create a tagger for the given configuration.
    pub fn new(config: TaggerConfig) -> Self {
        let name = config
            .program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| config.program.display().to_string());
        Self { config, name }
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    /// Persist the block into a fresh, uniquely named temp file.
    fn write_input(&self, block: &TextBlock) -> Result<NamedTempFile, ToolError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("input").suffix(".txt");

        let mut file = match &self.config.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(block.render().as_bytes())?;
        file.flush()?;

        Ok(file)
    }

    async fn run(&self, input: &NamedTempFile) -> Result<String, ToolError> {
        let mut command = Command::new(&self.config.program);
        command.args(&self.config.args);

        if let Some(dir) = &self.config.working_dir {
            command.current_dir(dir);
        }

        match self.config.input_mode {
            InputMode::Stdin => {
                command.stdin(Stdio::from(input.reopen()?));
            }
            InputMode::Argument => {
                command.arg(input.path()).stdin(Stdio::null());
            }
        }

        let child = command
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: self.name.clone(),
                source,
            })?;

        // Dropping the future on timeout drops the child, which kills it
        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout {
                program: self.name.clone(),
                after: self.config.timeout,
            })??;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if !output.status.success() {
            return Err(match output.status.code() {
                Some(code) => ToolError::NonZeroExit {
                    program: self.name.clone(),
                    code,
                    stderr,
                },
                None => ToolError::Interrupted {
                    program: self.name.clone(),
                },
            });
        }

        if !stderr.is_empty() {
            debug!(program = %self.name, %stderr, "tagger wrote to stderr");
        }

        String::from_utf8(output.stdout)
            .map_err(|e| ToolError::unreadable(format!("output is not valid UTF-8: {}", e)))
    }

    /// Remove the input file, or keep it when configured to.
    fn release(&self, input: NamedTempFile) {
        if self.config.keep_temp_files {
            match input.keep() {
                Ok((_, path)) => debug!(path = %path.display(), "kept tagger input file"),
                Err(e) => warn!(error = %e, "failed to keep tagger input file"),
            }
        } else if let Err(e) = input.close() {
            warn!(error = %e, "failed to remove tagger input file");
        }
    }
}

#[async_trait]
impl NerBackend for ProcessTagger {
    async fn tag(&self, block: &TextBlock) -> Result<TaggingResult, ToolError> {
        let input = self.write_input(block)?;
        debug!(
            program = %self.name,
            words = block.len(),
            input = %input.path().display(),
            "running tagger"
        );

        let outcome = self.run(&input).await;
        self.release(input);

        parse_output(&outcome?, self.config.label_column)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse column output: one word per non-blank line, the word in column 0
/// and its label in `label_column`.
pub fn parse_output(output: &str, label_column: usize) -> Result<TaggingResult, ToolError> {
    let mut result = Vec::new();

    for (line_no, line) in output.lines().enumerate() {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.is_empty() {
            continue;
        }

        let label = columns.get(label_column).ok_or_else(|| {
            ToolError::unreadable(format!(
                "line {} has {} column(s), label expected in column {}: {:?}",
                line_no + 1,
                columns.len(),
                label_column,
                line
            ))
        })?;

        result.push(TaggedWord::new(columns[0], *label));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_senna_columns() {
        let output = "         Open\t              O\n          the\t              O\n         door\t              O\n\n";
        let result = parse_output(output, 1).unwrap();
        assert_eq!(
            result,
            vec![
                TaggedWord::new("Open", "O"),
                TaggedWord::new("the", "O"),
                TaggedWord::new("door", "O"),
            ]
        );
    }

    #[test]
    fn test_parse_picks_configured_column() {
        let output = "John NNP S-PER\nsmiled VBD O\n";
        let result = parse_output(output, 2).unwrap();
        assert_eq!(result[0], TaggedWord::new("John", "S-PER"));
        assert_eq!(result[1], TaggedWord::new("smiled", "O"));
    }

    #[test]
    fn test_parse_rejects_missing_label() {
        let err = parse_output("John S-PER\nsmiled\n", 1).unwrap_err();
        match err {
            ToolError::UnreadableOutput(msg) => assert!(msg.starts_with("line 2 has 1 column(s)")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_output("\n  \n", 1).unwrap().is_empty());
    }

    #[test]
    fn test_name_from_program_path() {
        let config = TaggerConfig {
            program: "/opt/senna/senna-linux64".into(),
            ..TaggerConfig::default()
        };
        assert_eq!(ProcessTagger::new(config).name(), "senna-linux64");
    }
}
