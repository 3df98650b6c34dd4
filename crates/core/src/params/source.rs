//! Parameter sources: files and command-line arguments

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use super::loader::{ParseError, MAX_PARAMS_SIZE};
use super::path::ParamPathError;
use super::store::ParameterStore;

/// Errors raised while gathering parameters from outside the process
#[derive(Debug, Error)]
pub enum SourceError {
    /// Reading a parameter file failed
    #[error("cannot read parameter file {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Parameter file is over the size cap
    #[error("parameter file {} is {size} bytes, maximum is {max}", path.display())]
    FileTooLarge {
        /// File being read
        path: PathBuf,
        /// File size from metadata
        size: u64,
        /// Maximum allowed size
        max: usize,
    },

    /// A `-key=value` argument could not be applied
    #[error("invalid option '{arg}': {source}")]
    InvalidOption {
        /// The argument as given
        arg: String,
        /// Why the key was rejected
        #[source]
        source: ParamPathError,
    },

    /// Parameter text did not parse
    #[error("cannot parse parameters from {origin}: {source}")]
    Parse {
        /// File path or other origin label
        origin: String,
        /// Parser error
        #[source]
        source: ParseError,
    },
}

/// Read a parameter file, refusing oversized files before reading them
///
/// The returned text is trimmed.
pub fn read_params_file(path: impl AsRef<Path>) -> Result<String, SourceError> {
    let path = path.as_ref();
    let io_err = |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let size = fs::metadata(path).map_err(io_err)?.len();
    if size > MAX_PARAMS_SIZE as u64 {
        return Err(SourceError::FileTooLarge {
            path: path.to_path_buf(),
            size,
            max: MAX_PARAMS_SIZE,
        });
    }

    let text = fs::read_to_string(path).map_err(io_err)?;
    Ok(text.trim().to_string())
}

impl ParameterStore {
    /// Load a parameter file and merge it into this store
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<(), SourceError> {
        let path = path.as_ref();
        let text = read_params_file(path)?;
        let incoming = ParameterStore::from_text(&text).map_err(|source| SourceError::Parse {
            origin: path.display().to_string(),
            source,
        })?;
        self.merge(incoming);
        debug!(target: "docket::params", path = %path.display(), "Merged parameter file");
        Ok(())
    }

    /// Apply build-index style arguments
    ///
    /// `-key=value` sets a parameter; any other argument names a parameter
    /// file that is merged in. Arguments apply left to right, so later ones
    /// win. A bare `-key` sets the value to `true`.
    pub fn load_command_line<I, S>(&mut self, args: I) -> Result<(), SourceError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            match arg.strip_prefix('-') {
                Some(option) => {
                    let (key, value) = option.split_once('=').unwrap_or((option, "true"));
                    self.set_string(key, value)
                        .map_err(|source| SourceError::InvalidOption {
                            arg: arg.to_string(),
                            source,
                        })?;
                }
                None => self.merge_file(arg)?,
            }
        }
        Ok(())
    }
}
