// Keylayout Target Emitter
// Serializes the extracted key table as a macOS .keylayout document

use std::borrow::Cow;
use std::io;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use strum::IntoEnumIterator;

use crate::action::{classify, terminators, ActionTable, Cell, ClauseEffect};
use crate::command_layer::command_output;
use crate::extract::KeyData;
use crate::key::{ordered_keys, KeyId, RETURN_KEY_CODE, SPACE_KEY_CODE, TAB_KEY_CODE};
use crate::modifier::ModifierState;

/// DOCTYPE body of every generated layout
pub const DOCTYPE: &str =
    r#"keyboard SYSTEM "file://localhost/System/Library/DTDs/KeyboardLayout.dtd""#;

/// `maxout` attribute of the root element
pub const MAX_OUTPUT: u32 = 4;

/// Keys with a fixed output in every key map, after the 47 layout keys.
const SPECIAL_KEYS: [(u16, &str); 3] = [
    (RETURN_KEY_CODE, "\r"),
    (TAB_KEY_CODE, "\t"),
    (SPACE_KEY_CODE, " "),
];

/// Emission errors
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Generated layout is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Root-element attributes of the generated layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Display name shown in the input source menu
    pub name: String,
    /// Keyboard id; negative values are reserved for custom layouts
    pub keyboard_id: i32,
    /// Script group id
    pub group: i32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            name: "UniJoyMac".to_string(),
            keyboard_id: -8801,
            group: 126,
        }
    }
}

/// Render the full `.keylayout` document for an extracted key table.
pub fn emit_keylayout(data: &KeyData, options: &LayoutOptions) -> Result<String, EmitError> {
    let actions = ActionTable::collect(data);
    log::debug!(
        "Emitting layout '{}' (id {}, group {}) with {} actions",
        options.name,
        options.keyboard_id,
        options.group,
        actions.len()
    );

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

    let group = options.group.to_string();
    let id = options.keyboard_id.to_string();
    let maxout = MAX_OUTPUT.to_string();
    writer.write_event(Event::Start(element(
        "keyboard",
        &[
            ("group", group.as_str()),
            ("id", id.as_str()),
            ("name", options.name.as_str()),
            ("maxout", maxout.as_str()),
        ],
    )))?;

    write_layouts(&mut writer)?;
    write_modifier_map(&mut writer)?;
    write_key_map_set(&mut writer, data)?;
    if !actions.is_empty() {
        write_actions(&mut writer, &actions)?;
    }
    write_terminators(&mut writer)?;

    writer.write_event(Event::End(BytesEnd::new("keyboard")))?;

    let mut document = String::from_utf8(writer.into_inner())?;
    document.push('\n');
    Ok(document)
}

fn write_layouts(writer: &mut Writer<Vec<u8>>) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new("layouts")))?;
    writer.write_event(Event::Empty(element(
        "layout",
        &[("first", "0"), ("last", "0"), ("mapSet", "0"), ("modifiers", "0")],
    )))?;
    writer.write_event(Event::End(BytesEnd::new("layouts")))?;
    Ok(())
}

fn write_modifier_map(writer: &mut Writer<Vec<u8>>) -> Result<(), EmitError> {
    writer.write_event(Event::Start(element(
        "modifierMap",
        &[("id", "0"), ("defaultIndex", "0")],
    )))?;
    for state in ModifierState::iter() {
        let index = state.map_index().to_string();
        writer.write_event(Event::Start(element("keyMapSelect", &[("mapIndex", index.as_str())])))?;
        writer.write_event(Event::Empty(element(
            "modifier",
            &[("keys", state.modifier_keys())],
        )))?;
        writer.write_event(Event::End(BytesEnd::new("keyMapSelect")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("modifierMap")))?;
    Ok(())
}

fn write_key_map_set(writer: &mut Writer<Vec<u8>>, data: &KeyData) -> Result<(), EmitError> {
    writer.write_event(Event::Start(element("keyMapSet", &[("id", "0")])))?;
    for state in ModifierState::iter() {
        let index = state.map_index().to_string();
        writer.write_event(Event::Start(element("keyMap", &[("index", index.as_str())])))?;
        for key in ordered_keys() {
            write_key(writer, key.code(), cell_for(data, *key, state))?;
        }
        for (code, output) in SPECIAL_KEYS {
            write_key(writer, code, Cell::Output(output))?;
        }
        writer.write_event(Event::End(BytesEnd::new("keyMap")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("keyMapSet")))?;
    Ok(())
}

/// Source layers are classified; command layers come from the fixed tables.
fn cell_for(data: &KeyData, key: KeyId, state: ModifierState) -> Cell<'_> {
    if state.is_command() {
        Cell::Output(command_output(key, state).unwrap_or(""))
    } else {
        classify(data.output(key, state))
    }
}

fn write_key(writer: &mut Writer<Vec<u8>>, code: u16, cell: Cell<'_>) -> Result<(), EmitError> {
    let code = code.to_string();
    let key = match cell {
        Cell::Output(text) => element("key", &[("code", code.as_str()), ("output", text)]),
        Cell::Action(action) => element("key", &[("code", code.as_str()), ("action", action.id())]),
    };
    writer.write_event(Event::Empty(key))?;
    Ok(())
}

fn write_actions(writer: &mut Writer<Vec<u8>>, actions: &ActionTable) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new("actions")))?;
    for action in actions.iter() {
        writer.write_event(Event::Start(element("action", &[("id", action.id())])))?;
        for clause in action.clauses() {
            let when = match clause.effect {
                ClauseEffect::Output(ch) => {
                    let output = ch.to_string();
                    element("when", &[("state", clause.state), ("output", output.as_str())])
                }
                ClauseEffect::Next(next) => {
                    element("when", &[("state", clause.state), ("next", next)])
                }
            };
            writer.write_event(Event::Empty(when))?;
        }
        writer.write_event(Event::End(BytesEnd::new("action")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("actions")))?;
    Ok(())
}

fn write_terminators(writer: &mut Writer<Vec<u8>>) -> Result<(), EmitError> {
    writer.write_event(Event::Start(BytesStart::new("terminators")))?;
    for (state, output) in terminators() {
        let output = output.to_string();
        writer.write_event(Event::Empty(element(
            "when",
            &[("state", state), ("output", output.as_str())],
        )))?;
    }
    writer.write_event(Event::End(BytesEnd::new("terminators")))?;
    Ok(())
}

/// Build an element start tag with attribute values escaped by `escape_attribute`
fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attributes {
        let escaped = escape_attribute(value);
        start.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
    }
    start
}

/// Escape an attribute value.
///
/// Markup characters use entity references; control characters and any
/// whitespace other than a plain space use `&#xNNNN;` so an XML parser's
/// attribute-value normalization cannot turn them into spaces.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    if !value.chars().any(needs_escape) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 16);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            ch if needs_char_reference(ch) => {
                escaped.push_str(&format!("&#x{:04X};", ch as u32));
            }
            ch => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '&' | '<' | '>' | '"') || needs_char_reference(ch)
}

fn needs_char_reference(ch: char) -> bool {
    ch.is_control() || (ch.is_whitespace() && ch != ' ')
}
