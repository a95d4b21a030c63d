use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

pub mod jsonl;
pub mod records;

pub use jsonl::load_jsonl;
pub use records::{PredictionRecord, ReferenceRecord, RetrievedQa};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error in {path} at line {line} (record {index}): {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0} contains no records")]
    Empty(PathBuf),
}

impl InputError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        InputError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead>, InputError> {
    let file = File::open(path).map_err(|e| InputError::io(path, e))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

pub fn load_references(path: &Path) -> Result<Vec<ReferenceRecord>, InputError> {
    let refs = load_jsonl(path)?;
    tracing::info!(path = %path.display(), records = refs.len(), "loaded references");
    Ok(refs)
}

pub fn load_predictions(path: &Path) -> Result<Vec<PredictionRecord>, InputError> {
    let preds = load_jsonl(path)?;
    tracing::info!(path = %path.display(), records = preds.len(), "loaded predictions");
    Ok(preds)
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/tests.rs"]
mod tests;
