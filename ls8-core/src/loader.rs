use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{}'", .0.display())]
    Io(PathBuf, #[source] io::Error),
    #[error("line {line}: '{text}' is not an 8-bit binary literal")]
    InvalidLine { line: usize, text: String },
    #[error("program is {length} bytes, memory holds {capacity}")]
    ImageTooLarge { length: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, LoadError>;

/// Produces the byte image a machine executes from address 0.
pub trait ProgramLoader {
    fn load(&self) -> Result<Vec<u8>>;
}

/// Loads text images: one `0`/`1` byte literal per line, `#` starts a comment.
#[derive(Clone, Debug)]
pub struct TextImageLoader {
    path: PathBuf,
    capacity: usize,
}

impl TextImageLoader {
    pub fn new(path: impl AsRef<Path>, capacity: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            capacity,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgramLoader for TextImageLoader {
    fn load(&self) -> Result<Vec<u8>> {
        let source =
            fs::read_to_string(&self.path).map_err(|err| LoadError::Io(self.path.clone(), err))?;
        let image = parse_image(&source)?;
        if image.len() > self.capacity {
            return Err(LoadError::ImageTooLarge {
                length: image.len(),
                capacity: self.capacity,
            });
        }
        tracing::info!("loaded {} bytes from '{}'", image.len(), self.path.display());
        Ok(image)
    }
}

pub fn parse_image(source: &str) -> Result<Vec<u8>> {
    let mut image = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let code = match raw.split_once('#') {
            Some((code, _)) => code,
            None => raw,
        }
        .trim();
        if code.is_empty() {
            continue;
        }

        let is_binary = code.len() <= 8 && code.bytes().all(|b| b == b'0' || b == b'1');
        let byte = is_binary
            .then(|| u8::from_str_radix(code, 2).ok())
            .flatten()
            .ok_or_else(|| LoadError::InvalidLine {
                line: idx + 1,
                text: code.to_string(),
            })?;
        image.push(byte);
    }
    Ok(image)
}
