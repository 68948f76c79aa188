// Keylayout Command Layers
// Fixed US-ASCII outputs used while command is held, so shortcuts keep working

use crate::key::KeyId;
use crate::modifier::ModifierState;

/// Unshifted US-ASCII output per Avro key name
const COMMAND_UNSHIFTED: [(&str, &str); 47] = [
    ("OEM3", "`"),
    ("1", "1"),
    ("2", "2"),
    ("3", "3"),
    ("4", "4"),
    ("5", "5"),
    ("6", "6"),
    ("7", "7"),
    ("8", "8"),
    ("9", "9"),
    ("0", "0"),
    ("MINUS", "-"),
    ("PLUS", "="),
    ("Q", "q"),
    ("W", "w"),
    ("E", "e"),
    ("R", "r"),
    ("T", "t"),
    ("Y", "y"),
    ("U", "u"),
    ("I", "i"),
    ("O", "o"),
    ("P", "p"),
    ("OEM4", "["),
    ("OEM6", "]"),
    ("OEM5", "\\"),
    ("A", "a"),
    ("S", "s"),
    ("D", "d"),
    ("F", "f"),
    ("G", "g"),
    ("H", "h"),
    ("J", "j"),
    ("K", "k"),
    ("L", "l"),
    ("OEM1", ";"),
    ("OEM7", "'"),
    ("Z", "z"),
    ("X", "x"),
    ("C", "c"),
    ("V", "v"),
    ("B", "b"),
    ("N", "n"),
    ("M", "m"),
    ("COMMA", ","),
    ("PERIOD", "."),
    ("OEM2", "/"),
];

/// Shifted US-ASCII output per Avro key name
const COMMAND_SHIFTED: [(&str, &str); 47] = [
    ("OEM3", "~"),
    ("1", "!"),
    ("2", "@"),
    ("3", "#"),
    ("4", "$"),
    ("5", "%"),
    ("6", "^"),
    ("7", "&"),
    ("8", "*"),
    ("9", "("),
    ("0", ")"),
    ("MINUS", "_"),
    ("PLUS", "+"),
    ("Q", "Q"),
    ("W", "W"),
    ("E", "E"),
    ("R", "R"),
    ("T", "T"),
    ("Y", "Y"),
    ("U", "U"),
    ("I", "I"),
    ("O", "O"),
    ("P", "P"),
    ("OEM4", "{"),
    ("OEM6", "}"),
    ("OEM5", "|"),
    ("A", "A"),
    ("S", "S"),
    ("D", "D"),
    ("F", "F"),
    ("G", "G"),
    ("H", "H"),
    ("J", "J"),
    ("K", "K"),
    ("L", "L"),
    ("OEM1", ":"),
    ("OEM7", "\""),
    ("Z", "Z"),
    ("X", "X"),
    ("C", "C"),
    ("V", "V"),
    ("B", "B"),
    ("N", "N"),
    ("M", "M"),
    ("COMMA", "<"),
    ("PERIOD", ">"),
    ("OEM2", "?"),
];

/// Output of `key` in a command layer.
///
/// Option does not change the result: both command layers with and without
/// option share the same table. Returns `None` for non-command states.
pub fn command_output(key: KeyId, state: ModifierState) -> Option<&'static str> {
    if !state.is_command() {
        return None;
    }
    let table = if state.is_shifted() {
        &COMMAND_SHIFTED
    } else {
        &COMMAND_UNSHIFTED
    };
    table
        .iter()
        .find(|(name, _)| *name == key.name())
        .map(|(_, output)| *output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn key(name: &str) -> KeyId {
        KeyId::from_name(name).unwrap()
    }

    #[test]
    fn test_tables_cover_every_key() {
        for state in ModifierState::COMMAND {
            for key in KeyId::all() {
                let output = command_output(key, state);
                assert!(output.is_some(), "{} has no {} output", key, state);
                assert!(output.unwrap().is_ascii());
            }
        }
    }

    #[test]
    fn test_tables_have_no_duplicate_outputs() {
        for table in [&COMMAND_UNSHIFTED, &COMMAND_SHIFTED] {
            let outputs: HashSet<_> = table.iter().map(|(_, output)| *output).collect();
            assert_eq!(outputs.len(), 47);
        }
    }

    #[test]
    fn test_option_does_not_change_output() {
        for key in KeyId::all() {
            assert_eq!(
                command_output(key, ModifierState::Command),
                command_output(key, ModifierState::OptionCommand)
            );
            assert_eq!(
                command_output(key, ModifierState::ShiftCommand),
                command_output(key, ModifierState::ShiftOptionCommand)
            );
        }
    }

    #[test]
    fn test_known_outputs() {
        assert_eq!(command_output(key("A"), ModifierState::Command), Some("a"));
        assert_eq!(command_output(key("A"), ModifierState::ShiftCommand), Some("A"));
        assert_eq!(command_output(key("OEM7"), ModifierState::ShiftCommand), Some("\""));
        assert_eq!(command_output(key("OEM5"), ModifierState::OptionCommand), Some("\\"));
    }

    #[test]
    fn test_source_states_have_no_command_output() {
        for state in ModifierState::SOURCE {
            assert_eq!(command_output(key("A"), state), None);
        }
    }
}
