// Keylayout Action Classifier
// Virama + vowel-sign composition expressed as keylayout actions

use std::fmt;

use crate::extract::KeyData;

/// BENGALI SIGN VIRAMA (hasanta)
pub const VIRAMA: char = '\u{09CD}';

/// Initial state of every keylayout state machine
pub const NONE_STATE: &str = "none";

/// State entered after a lone virama keystroke
pub const VIRAMA_STATE: &str = "state_virama";

/// Action id of the virama trigger
pub const VIRAMA_ACTION_ID: &str = "act_virama";

/// A dependent vowel sign and the independent vowel it becomes after virama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VowelSign {
    pub sign: char,
    pub independent: char,
    pub id: &'static str,
}

const fn vowel(sign: char, independent: char, id: &'static str) -> VowelSign {
    VowelSign {
        sign,
        independent,
        id,
    }
}

/// The fixed vowel-action table, in emission order.
pub const VOWEL_SIGNS: [VowelSign; 10] = [
    vowel('\u{09BE}', '\u{0986}', "act_sign_aa"), // া -> আ
    vowel('\u{09BF}', '\u{0987}', "act_sign_i"),  // ি -> ই
    vowel('\u{09C0}', '\u{0988}', "act_sign_ii"), // ী -> ঈ
    vowel('\u{09C1}', '\u{0989}', "act_sign_u"),  // ু -> উ
    vowel('\u{09C2}', '\u{098A}', "act_sign_uu"), // ূ -> ঊ
    vowel('\u{09C3}', '\u{098B}', "act_sign_ri"), // ৃ -> ঋ
    vowel('\u{09C7}', '\u{098F}', "act_sign_e"),  // ে -> এ
    vowel('\u{09C8}', '\u{0990}', "act_sign_oi"), // ৈ -> ঐ
    vowel('\u{09CB}', '\u{0993}', "act_sign_o"),  // ো -> ও
    vowel('\u{09CC}', '\u{0994}', "act_sign_ou"), // ৌ -> ঔ
];

/// A stateful action triggered by one of the 11 trigger characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    Virama,
    Vowel(VowelSign),
}

/// What a `when` clause does in a given state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseEffect {
    /// Emit a character and return to `none`
    Output(char),
    /// Emit nothing and enter the named state
    Next(&'static str),
}

/// One `<when state=...>` clause of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionClause {
    pub state: &'static str,
    pub effect: ClauseEffect,
}

impl ActionId {
    /// The action for an output that is exactly one trigger character
    pub fn for_trigger(text: &str) -> Option<Self> {
        let mut chars = text.chars();
        let ch = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if ch == VIRAMA {
            return Some(Self::Virama);
        }
        VOWEL_SIGNS
            .iter()
            .find(|vowel| vowel.sign == ch)
            .map(|vowel| Self::Vowel(*vowel))
    }

    /// Action id as written in the layout
    pub fn id(self) -> &'static str {
        match self {
            Self::Virama => VIRAMA_ACTION_ID,
            Self::Vowel(vowel) => vowel.id,
        }
    }

    /// The character that triggers this action
    pub fn trigger(self) -> char {
        match self {
            Self::Virama => VIRAMA,
            Self::Vowel(vowel) => vowel.sign,
        }
    }

    /// The `none` and `state_virama` clauses, in that order
    pub fn clauses(self) -> [ActionClause; 2] {
        let when_none = match self {
            Self::Virama => ClauseEffect::Next(VIRAMA_STATE),
            Self::Vowel(vowel) => ClauseEffect::Output(vowel.sign),
        };
        let when_pending = match self {
            Self::Virama => ClauseEffect::Output(VIRAMA),
            Self::Vowel(vowel) => ClauseEffect::Output(vowel.independent),
        };
        [
            ActionClause {
                state: NONE_STATE,
                effect: when_none,
            },
            ActionClause {
                state: VIRAMA_STATE,
                effect: when_pending,
            },
        ]
    }

    fn clause_for(self, state: CompositionState) -> ClauseEffect {
        let [when_none, when_pending] = self.clauses();
        match state {
            CompositionState::None => when_none.effect,
            CompositionState::ViramaPending => when_pending.effect,
        }
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// The fixed terminator table: pending state and what abandoning it emits
pub fn terminators() -> [(&'static str, char); 1] {
    [(VIRAMA_STATE, VIRAMA)]
}

/// How a single key-map cell is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell<'a> {
    /// `output="..."`
    Output(&'a str),
    /// `action="..."`
    Action(ActionId),
}

/// Classify one output cell as a literal or an action reference
pub fn classify(text: &str) -> Cell<'_> {
    match ActionId::for_trigger(text) {
        Some(action) => Cell::Action(action),
        None => Cell::Output(text),
    }
}

/// Distinct actions referenced by the source layers.
///
/// The virama action comes first and is present whenever any action is,
/// since every vowel action depends on the state it enters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionTable {
    actions: Vec<ActionId>,
}

impl ActionTable {
    pub fn collect(data: &KeyData) -> Self {
        let referenced: Vec<ActionId> = data
            .populated()
            .filter_map(|(_, _, text)| ActionId::for_trigger(text))
            .collect();

        if referenced.is_empty() {
            return Self::default();
        }

        let mut actions = vec![ActionId::Virama];
        actions.extend(
            VOWEL_SIGNS
                .iter()
                .map(|vowel| ActionId::Vowel(*vowel))
                .filter(|action| referenced.contains(action)),
        );
        log::debug!("Collected {} actions", actions.len());
        Self { actions }
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().copied()
    }
}

/// Pending composition state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionState {
    #[default]
    None,
    ViramaPending,
}

impl CompositionState {
    pub fn name(self) -> &'static str {
        match self {
            Self::None => NONE_STATE,
            Self::ViramaPending => VIRAMA_STATE,
        }
    }

    /// Parse a state name as written in `when state=` and `next=`
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            NONE_STATE => Some(Self::None),
            VIRAMA_STATE => Some(Self::ViramaPending),
            _ => None,
        }
    }
}

/// Executable model of the emitted action graph.
///
/// Feeds key outputs through the same clauses the emitter writes, so the
/// result is what the macOS input engine produces for the generated layout.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    state: CompositionState,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CompositionState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == CompositionState::ViramaPending
    }

    /// Process one keystroke's output and return the text committed by it.
    pub fn press(&mut self, text: &str) -> String {
        match classify(text) {
            Cell::Action(action) => match action.clause_for(self.state) {
                ClauseEffect::Output(ch) => {
                    self.state = CompositionState::None;
                    ch.to_string()
                }
                ClauseEffect::Next(next) => {
                    self.state = CompositionState::from_name(next).unwrap_or_else(|| {
                        log::warn!("Action {} enters unknown state '{}'", action, next);
                        CompositionState::None
                    });
                    String::new()
                }
            },
            Cell::Output(literal) => {
                let mut committed = self.terminate().map(String::from).unwrap_or_default();
                committed.push_str(literal);
                committed
            }
        }
    }

    /// Abandon a pending composition, returning the terminator output.
    pub fn terminate(&mut self) -> Option<char> {
        let pending = self.state.name();
        self.state = CompositionState::None;
        terminators()
            .iter()
            .find(|(state, _)| *state == pending)
            .map(|(_, output)| *output)
    }
}
