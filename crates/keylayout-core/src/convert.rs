// Keylayout Conversion Pipeline
// Avro .avrolayout text in, macOS .keylayout text out

use crate::emit::{emit_keylayout, EmitError, LayoutOptions};
use crate::extract::{ExtractError, KeyData};

/// Conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Convert an `.avrolayout` document into a `.keylayout` document.
///
/// Pure and deterministic: identical input and options always produce
/// byte-identical output. Nothing is produced if the source has no
/// `<KeyData>` section.
pub fn convert(source: &str, options: &LayoutOptions) -> Result<String, ConvertError> {
    let data = KeyData::from_avrolayout(source)?;
    log::debug!("{} non-empty cells in source layout", data.populated().count());
    Ok(emit_keylayout(&data, options)?)
}
