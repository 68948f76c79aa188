// Keylayout Modifier States
// The eight output layers of a generated layout, in key-map index order

use strum_macros::{AsRefStr, Display, EnumIter};

/// A combination of held modifiers selecting one output layer.
///
/// The first four states are read from the source layout; the command states
/// are always synthesized. Declaration order is the key-map index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ModifierState {
    Normal,
    Shift,
    Option,
    OptionShift,
    Command,
    ShiftCommand,
    OptionCommand,
    ShiftOptionCommand,
}

impl ModifierState {
    /// States populated from the source document
    pub const SOURCE: [ModifierState; 4] = [
        ModifierState::Normal,
        ModifierState::Shift,
        ModifierState::Option,
        ModifierState::OptionShift,
    ];

    /// States populated from the fixed command-layer tables
    pub const COMMAND: [ModifierState; 4] = [
        ModifierState::Command,
        ModifierState::ShiftCommand,
        ModifierState::OptionCommand,
        ModifierState::ShiftOptionCommand,
    ];

    /// Index of the `keyMap` this state selects (0-7)
    pub fn map_index(self) -> u8 {
        self as u8
    }

    /// Parse an Avro field-name suffix (`Normal`, `Shift`, `AltGr`, `ShiftAltGr`)
    pub fn from_avro_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "Normal" => Some(Self::Normal),
            "Shift" => Some(Self::Shift),
            "AltGr" => Some(Self::Option),
            "ShiftAltGr" => Some(Self::OptionShift),
            _ => None,
        }
    }

    /// `keys` attribute of the `modifier` element selecting this layer
    pub fn modifier_keys(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Shift => "anyShift",
            Self::Option => "anyOption",
            Self::OptionShift => "anyShift anyOption",
            Self::Command => "command",
            Self::ShiftCommand => "anyShift command",
            Self::OptionCommand => "anyOption command",
            Self::ShiftOptionCommand => "anyShift anyOption command",
        }
    }

    /// Returns true if command is part of this state
    pub fn is_command(self) -> bool {
        Self::COMMAND.contains(&self)
    }

    /// Returns true if shift is part of this state
    pub fn is_shifted(self) -> bool {
        matches!(
            self,
            Self::Shift | Self::OptionShift | Self::ShiftCommand | Self::ShiftOptionCommand
        )
    }
}
