//! Missing-reference CSV output.

use std::path::Path;

use bbdir_model::ID_ATTRIBUTE;
use csv::WriterBuilder;

use crate::error::{IngestError, Result};

/// Write one `id` per row, semicolon-delimited like the supplemental inputs.
pub fn write_id_csv<I, S>(path: &Path, ids: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let csv_error = |message: String| IngestError::Csv {
        path: path.to_path_buf(),
        message,
    };
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(|e| csv_error(e.to_string()))?;
    writer
        .write_record([ID_ATTRIBUTE])
        .map_err(|e| csv_error(e.to_string()))?;
    for id in ids {
        writer
            .write_record([id.as_ref()])
            .map_err(|e| csv_error(e.to_string()))?;
    }
    writer.flush().map_err(|source| IngestError::Write {
        path: path.to_path_buf(),
        source,
    })
}
