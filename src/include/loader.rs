//! Reading script files.

use super::IncludeError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read the whole of `path` and split it into lines.
///
/// Every line keeps its `\n`; a last line without one is kept as is. The file handle is
/// closed before this returns. Content that is not valid UTF-8 is refused as a whole, so
/// a binary file never gets a single line executed.
pub fn load(path: &Path) -> Result<Vec<String>, IncludeError> {
    let open_failed = |source| IncludeError::OpenFailed {
        path: path.to_path_buf(),
        source,
    };

    let bytes = {
        let mut file = File::open(path).map_err(open_failed)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(open_failed)?;
        bytes
    };

    let text = String::from_utf8(bytes).map_err(|source| IncludeError::NotText {
        path: path.to_path_buf(),
        source,
    })?;

    let lines: Vec<String> = text.split_inclusive('\n').map(str::to_owned).collect();
    tracing::debug!(path = %path.display(), lines = lines.len(), "loaded");
    Ok(lines)
}
