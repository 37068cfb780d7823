use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ExportError;
use crate::export::ExportArtifact;
use crate::sanitize;

const MAX_NAME_ATTEMPTS: usize = 1000;

/// Writes export artifacts into a directory without overwriting.
pub struct ExportWriter {
    directory: PathBuf,
}

impl ExportWriter {
    pub fn new<P: AsRef<Path>>(directory: P) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Writes `artifact`, choosing `name_2.txt`, `name_3.txt`, ... when the
    /// name is taken. Returns the path written.
    pub fn write(&self, artifact: &ExportArtifact) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.directory).map_err(|e| ExportError::CreateDirectory {
            path: self.directory.clone(),
            source: e,
        })?;

        let path = self.create_exclusive(&artifact.filename, artifact.contents.as_bytes())?;
        info!(
            filename = %sanitize::redact_path(&path),
            bytes = artifact.contents.len(),
            "Exported analysis results"
        );
        Ok(path)
    }

    fn create_exclusive(&self, filename: &str, content: &[u8]) -> Result<PathBuf, ExportError> {
        let (base, ext) = match filename.rfind('.') {
            Some(dot_pos) => (&filename[..dot_pos], Some(&filename[dot_pos..])),
            None => (filename, None),
        };

        for counter in 1..=MAX_NAME_ATTEMPTS {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = self.directory.join(&try_filename);

            // create_new is an atomic check-and-create
            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| ExportError::WriteFile {
                            path: try_path.clone(),
                            source: e,
                        })?;
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(ExportError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(ExportError::NameExhausted(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn artifact(contents: &str) -> ExportArtifact {
        ExportArtifact {
            filename: "document-analysis-2024-01-31.txt".to_string(),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_write_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let writer = ExportWriter::new(temp.path().join("exports"));

        let path = writer.write(&artifact("hello")).unwrap();

        assert_eq!(
            path,
            temp.path()
                .join("exports")
                .join("document-analysis-2024-01-31.txt")
        );
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn test_write_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let writer = ExportWriter::new(temp.path());

        let first = writer.write(&artifact("one")).unwrap();
        let second = writer.write(&artifact("two")).unwrap();
        let third = writer.write(&artifact("three")).unwrap();

        assert_eq!(
            second.file_name().unwrap(),
            "document-analysis-2024-01-31_2.txt"
        );
        assert_eq!(
            third.file_name().unwrap(),
            "document-analysis-2024-01-31_3.txt"
        );
        assert_eq!(std::fs::read_to_string(first).unwrap(), "one");
        assert_eq!(std::fs::read_to_string(second).unwrap(), "two");
    }
}
