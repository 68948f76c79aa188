// Keylayout Source Extractor
// Reads per-key, per-modifier outputs out of an Avro .avrolayout document

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::key::KeyId;
use crate::modifier::ModifierState;

const KEY_DATA_OPEN: &str = "<KeyData>";
const KEY_DATA_CLOSE: &str = "</KeyData>";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Source extraction errors
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("No <KeyData> section found in avrolayout document")]
    MissingKeyData,
}

/// Opening tag of a key field, e.g. `<OEM3_ShiftAltGr>`.
///
/// The regex crate has no backreferences, so the matching closing tag is
/// located separately by `KeyData::from_avrolayout`.
fn field_open_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9]+)_(Normal|Shift|AltGr|ShiftAltGr)>")
            .expect("field pattern is a valid regex")
    })
}

/// Output text per source modifier state for one key
pub type KeyOutputs = IndexMap<ModifierState, String>;

/// The extracted key table: every known key, every source modifier state.
///
/// Keys absent from the source document map to empty strings. Text is kept
/// exactly as written; no Unicode normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyData {
    cells: IndexMap<KeyId, KeyOutputs>,
}

impl Default for KeyData {
    fn default() -> Self {
        let cells = KeyId::all()
            .map(|key| {
                let outputs = ModifierState::SOURCE
                    .iter()
                    .map(|state| (*state, String::new()))
                    .collect();
                (key, outputs)
            })
            .collect();
        Self { cells }
    }
}

impl KeyData {
    /// Extract the key table from raw `.avrolayout` text
    pub fn from_avrolayout(source: &str) -> Result<Self, ExtractError> {
        let section = key_data_section(source).ok_or(ExtractError::MissingKeyData)?;
        let mut data = Self::default();
        let mut fields = 0usize;
        let mut pos = 0usize;

        while let Some(caps) = field_open_pattern().captures_at(section, pos) {
            let Some(open) = caps.get(0) else {
                break;
            };
            let name = &caps[1];
            let suffix = &caps[2];
            let close = format!("</{}_{}>", name, suffix);

            let body_start = open.end();
            let Some(body_len) = section[body_start..].find(&close) else {
                log::trace!("Unterminated field <{}_{}>, skipping", name, suffix);
                pos = body_start;
                continue;
            };
            let body = &section[body_start..body_start + body_len];
            pos = body_start + body_len + close.len();

            let Some(key) = KeyId::from_name(name) else {
                log::debug!("Ignoring unsupported key '{}'", name);
                continue;
            };
            let Some(state) = ModifierState::from_avro_suffix(suffix) else {
                continue;
            };

            data.set(key, state, unwrap_field_body(body));
            fields += 1;
        }

        log::debug!("Extracted {} key fields from <KeyData>", fields);
        Ok(data)
    }

    fn set(&mut self, key: KeyId, state: ModifierState, text: &str) {
        if let Some(outputs) = self.cells.get_mut(&key) {
            outputs.insert(state, text.to_string());
        }
    }

    /// Output text for a key in a source state; empty for command states.
    pub fn output(&self, key: KeyId, state: ModifierState) -> &str {
        self.cells
            .get(&key)
            .and_then(|outputs| outputs.get(&state))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Iterate keys in Avro row order
    pub fn iter(&self) -> impl Iterator<Item = (KeyId, &KeyOutputs)> {
        self.cells.iter().map(|(key, outputs)| (*key, outputs))
    }

    /// Iterate every non-empty cell
    pub fn populated(&self) -> impl Iterator<Item = (KeyId, ModifierState, &str)> {
        self.iter().flat_map(|(key, outputs)| {
            outputs
                .iter()
                .filter(|(_, text)| !text.is_empty())
                .map(move |(state, text)| (key, *state, text.as_str()))
        })
    }
}

/// Text between the first `<KeyData>` and the `</KeyData>` that follows it
fn key_data_section(source: &str) -> Option<&str> {
    let start = source.find(KEY_DATA_OPEN)? + KEY_DATA_OPEN.len();
    let len = source[start..].find(KEY_DATA_CLOSE)?;
    Some(&source[start..start + len])
}

/// Trim a field body and strip its CDATA envelope, if any.
pub fn unwrap_field_body(body: &str) -> &str {
    let trimmed = body.trim();
    trimmed
        .strip_prefix(CDATA_OPEN)
        .and_then(|rest| rest.strip_suffix(CDATA_CLOSE))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(name: &str) -> KeyId {
        KeyId::from_name(name).unwrap()
    }

    fn layout(key_data: &str) -> String {
        format!(
            "<?xml version=\"1.0\"?>\n<Layout>\n<Info><Name>Test</Name></Info>\n<KeyData>\n{}\n</KeyData>\n</Layout>",
            key_data
        )
    }

    #[test]
    fn test_missing_key_data_section() {
        let err = KeyData::from_avrolayout("<Layout><Info/></Layout>").unwrap_err();
        assert!(matches!(err, ExtractError::MissingKeyData));
    }

    #[test]
    fn test_unclosed_key_data_section() {
        let err = KeyData::from_avrolayout("<Layout><KeyData><A_Normal>a</A_Normal>").unwrap_err();
        assert!(matches!(err, ExtractError::MissingKeyData));
    }

    #[test]
    fn test_empty_section_defaults_everything() {
        let data = KeyData::from_avrolayout(&layout("")).unwrap();
        assert_eq!(data.iter().count(), 47);
        assert_eq!(data.populated().count(), 0);
        for (_, outputs) in data.iter() {
            assert_eq!(outputs.len(), 4);
        }
    }

    #[test]
    fn test_cdata_fields_are_unwrapped() {
        let data = KeyData::from_avrolayout(&layout(
            "<A_Normal><![CDATA[\u{09BE}]]></A_Normal>\n<A_Shift><![CDATA[\u{0985}]]></A_Shift>",
        ))
        .unwrap();
        assert_eq!(data.output(key("A"), ModifierState::Normal), "\u{09BE}");
        assert_eq!(data.output(key("A"), ModifierState::Shift), "\u{0985}");
        assert_eq!(data.output(key("A"), ModifierState::Option), "");
    }

    #[test]
    fn test_plain_body_is_trimmed() {
        let data = KeyData::from_avrolayout(&layout("<J_AltGr>\n   \u{0995}  \n</J_AltGr>")).unwrap();
        assert_eq!(data.output(key("J"), ModifierState::Option), "\u{0995}");
    }

    #[test]
    fn test_cdata_inner_text_is_verbatim() {
        let data =
            KeyData::from_avrolayout(&layout("<K_ShiftAltGr><![CDATA[ x ]]></K_ShiftAltGr>")).unwrap();
        assert_eq!(data.output(key("K"), ModifierState::OptionShift), " x ");
    }

    #[test]
    fn test_no_normalization() {
        // Decomposed YA + NUKTA must not be folded into U+09DF.
        let decomposed = "\u{09AF}\u{09BC}";
        let data = KeyData::from_avrolayout(&layout(&format!(
            "<Y_Shift><![CDATA[{}]]></Y_Shift>",
            decomposed
        )))
        .unwrap();
        assert_eq!(data.output(key("Y"), ModifierState::Shift), decomposed);
    }

    #[test]
    fn test_unknown_keys_and_suffixes_are_skipped() {
        let data = KeyData::from_avrolayout(&layout(
            "<F1_Normal>x</F1_Normal><Q_Ctrl>y</Q_Ctrl><Q_Normal>q</Q_Normal>",
        ))
        .unwrap();
        assert_eq!(data.populated().count(), 1);
        assert_eq!(data.output(key("Q"), ModifierState::Normal), "q");
    }

    #[test]
    fn test_unterminated_field_is_skipped() {
        let data =
            KeyData::from_avrolayout(&layout("<A_Normal>a<S_Normal>s</S_Normal>")).unwrap();
        assert_eq!(data.output(key("A"), ModifierState::Normal), "");
        assert_eq!(data.output(key("S"), ModifierState::Normal), "s");
    }

    #[test]
    fn test_fields_outside_key_data_ignored() {
        let source = format!("<A_Normal>z</A_Normal>{}", layout("<S_Normal>s</S_Normal>"));
        let data = KeyData::from_avrolayout(&source).unwrap();
        assert_eq!(data.output(key("A"), ModifierState::Normal), "");
        assert_eq!(data.output(key("S"), ModifierState::Normal), "s");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let data =
            KeyData::from_avrolayout(&layout("<B_Normal>1</B_Normal><B_Normal>2</B_Normal>")).unwrap();
        assert_eq!(data.output(key("B"), ModifierState::Normal), "2");
    }

    #[test]
    fn test_command_states_are_never_sourced() {
        let data = KeyData::from_avrolayout(&layout("<A_Normal>a</A_Normal>")).unwrap();
        assert_eq!(data.output(key("A"), ModifierState::Command), "");
    }

    #[test]
    fn test_unwrap_field_body() {
        assert_eq!(unwrap_field_body("  <![CDATA[]]> "), "");
        assert_eq!(unwrap_field_body("<![CDATA[a]]"), "<![CDATA[a]]");
        assert_eq!(unwrap_field_body("\tplain\n"), "plain");
    }
}
