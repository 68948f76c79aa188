// Keylayout Core Library
// Avro keyboard layout to macOS .keylayout conversion

pub mod action;
pub mod command_layer;
pub mod convert;
pub mod emit;
pub mod extract;
pub mod key;
pub mod modifier;

pub use action::{ActionId, ActionTable, Cell, Composer, CompositionState, VowelSign};
pub use command_layer::command_output;
pub use convert::{convert, ConvertError};
pub use emit::{emit_keylayout, EmitError, LayoutOptions};
pub use extract::{ExtractError, KeyData};
pub use key::{keycode_for, ordered_keys, KeyId};
pub use modifier::ModifierState;
