// Keylayout Key Identity Table
// Maps Avro physical-key names to macOS ANSI virtual key codes

use std::fmt;
use std::sync::OnceLock;

/// Avro key name and macOS virtual key code, in Avro's row order.
///
/// The codes are the `kVK_ANSI_*` constants from HIToolbox `Events.h`.
const KEY_TABLE: [(&str, u16); 47] = [
    ("OEM3", 50), // ` ~
    ("1", 18),
    ("2", 19),
    ("3", 20),
    ("4", 21),
    ("5", 23),
    ("6", 22),
    ("7", 26),
    ("8", 28),
    ("9", 25),
    ("0", 29),
    ("MINUS", 27),
    ("PLUS", 24),
    ("Q", 12),
    ("W", 13),
    ("E", 14),
    ("R", 15),
    ("T", 17),
    ("Y", 16),
    ("U", 32),
    ("I", 34),
    ("O", 31),
    ("P", 35),
    ("OEM4", 33), // [ {
    ("OEM6", 30), // ] }
    ("OEM5", 42), // \ |
    ("A", 0),
    ("S", 1),
    ("D", 2),
    ("F", 3),
    ("G", 5),
    ("H", 4),
    ("J", 38),
    ("K", 40),
    ("L", 37),
    ("OEM1", 41), // ; :
    ("OEM7", 39), // ' "
    ("Z", 6),
    ("X", 7),
    ("C", 8),
    ("V", 9),
    ("B", 11),
    ("N", 45),
    ("M", 46),
    ("COMMA", 43),
    ("PERIOD", 47),
    ("OEM2", 44), // / ?
];

/// kVK_Return
pub const RETURN_KEY_CODE: u16 = 36;
/// kVK_Tab
pub const TAB_KEY_CODE: u16 = 48;
/// kVK_Space
pub const SPACE_KEY_CODE: u16 = 49;
/// kVK_Delete. Never emitted: macOS handles backspace natively.
pub const DELETE_KEY_CODE: u16 = 51;

/// One of the 47 physical keys known to the converter.
///
/// A `KeyId` can only be obtained from the fixed table, so `code()` is total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct KeyId(u8);

impl KeyId {
    /// Look up a key by its Avro name (case-sensitive, e.g. `"A"`, `"OEM3"`).
    pub fn from_name(name: &str) -> Option<Self> {
        KEY_TABLE
            .iter()
            .position(|(key_name, _)| *key_name == name)
            .map(|index| Self(index as u8))
    }

    /// Avro name of this key
    pub fn name(self) -> &'static str {
        KEY_TABLE[self.0 as usize].0
    }

    /// macOS virtual key code
    pub fn code(self) -> u16 {
        KEY_TABLE[self.0 as usize].1
    }

    /// All keys in Avro row order
    pub fn all() -> impl Iterator<Item = KeyId> {
        (0..KEY_TABLE.len()).map(|index| Self(index as u8))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Key code for an Avro key name, or `None` if the key is not in the table.
pub fn keycode_for(name: &str) -> Option<u16> {
    KeyId::from_name(name).map(KeyId::code)
}

/// All keys sorted ascending by key code. This is the emission order of every
/// key map in the generated layout.
pub fn ordered_keys() -> &'static [KeyId] {
    static ORDERED: OnceLock<Vec<KeyId>> = OnceLock::new();
    ORDERED.get_or_init(|| {
        let mut keys: Vec<KeyId> = KeyId::all().collect();
        keys.sort_by_key(|key| key.code());
        keys
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ordered_keys_strictly_increasing() {
        let keys = ordered_keys();
        assert_eq!(keys.len(), 47);
        for pair in keys.windows(2) {
            assert!(
                pair[0].code() < pair[1].code(),
                "{} ({}) must sort before {} ({})",
                pair[0],
                pair[0].code(),
                pair[1],
                pair[1].code()
            );
        }
    }

    #[test]
    fn test_names_and_codes_are_unique() {
        let names: HashSet<_> = KeyId::all().map(KeyId::name).collect();
        let codes: HashSet<_> = KeyId::all().map(KeyId::code).collect();
        assert_eq!(names.len(), 47);
        assert_eq!(codes.len(), 47);
    }

    #[test]
    fn test_special_codes_not_in_table() {
        for code in [RETURN_KEY_CODE, TAB_KEY_CODE, SPACE_KEY_CODE, DELETE_KEY_CODE] {
            assert!(KeyId::all().all(|key| key.code() != code));
        }
    }

    #[test]
    fn test_keycode_lookup() {
        assert_eq!(keycode_for("A"), Some(0));
        assert_eq!(keycode_for("OEM3"), Some(50));
        assert_eq!(keycode_for("PLUS"), Some(24));
        assert_eq!(keycode_for("OEM2"), Some(44));
        assert_eq!(keycode_for("a"), None);
        assert_eq!(keycode_for("F1"), None);
    }

    #[test]
    fn test_first_and_last_ordered() {
        let keys = ordered_keys();
        assert_eq!(keys[0].name(), "A");
        assert_eq!(keys[46].name(), "OEM3");
    }
}
