//! Linux key codes and keyboard layouts
//!
//! Input devices report physical key positions. [`KeyMapper`] turns them into
//! [`KeyEvent`]s for a QWERTY or AZERTY layout, tracking shift and caps lock.
//! Characters are emitted when the key is released.

use super::KeyEvent;
use log::warn;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// `EV_KEY` event type from linux/input-event-codes.h
pub const EV_KEY: u16 = 0x01;

/// Key event values
pub const KEY_UP: i32 = 0;
pub const KEY_DOWN: i32 = 1;
pub const KEY_REPEAT: i32 = 2;

pub const KEY_ENTER: u16 = 28;
pub const KEY_LEFTSHIFT: u16 = 42;
pub const KEY_RIGHTSHIFT: u16 = 54;
pub const KEY_SPACE: u16 = 57;
pub const KEY_CAPSLOCK: u16 = 58;
pub const KEY_KPENTER: u16 = 96;
pub const KEY_MUTE: u16 = 113;
pub const KEY_VOLUMEDOWN: u16 = 114;
pub const KEY_VOLUMEUP: u16 = 115;

/// (code, unshifted, shifted) for the US QWERTY layout
const QWERTY: &[(u16, char, char)] = &[
    // Number row
    (2, '1', '!'),
    (3, '2', '@'),
    (4, '3', '#'),
    (5, '4', '$'),
    (6, '5', '%'),
    (7, '6', '^'),
    (8, '7', '&'),
    (9, '8', '*'),
    (10, '9', '('),
    (11, '0', ')'),
    (12, '-', '_'),
    (13, '=', '+'),
    // Top row
    (16, 'q', 'Q'),
    (17, 'w', 'W'),
    (18, 'e', 'E'),
    (19, 'r', 'R'),
    (20, 't', 'T'),
    (21, 'y', 'Y'),
    (22, 'u', 'U'),
    (23, 'i', 'I'),
    (24, 'o', 'O'),
    (25, 'p', 'P'),
    (26, '[', '{'),
    (27, ']', '}'),
    // Home row
    (30, 'a', 'A'),
    (31, 's', 'S'),
    (32, 'd', 'D'),
    (33, 'f', 'F'),
    (34, 'g', 'G'),
    (35, 'h', 'H'),
    (36, 'j', 'J'),
    (37, 'k', 'K'),
    (38, 'l', 'L'),
    (39, ';', ':'),
    (40, '\'', '"'),
    (41, '`', '~'),
    (43, '\\', '|'),
    // Bottom row
    (44, 'z', 'Z'),
    (45, 'x', 'X'),
    (46, 'c', 'C'),
    (47, 'v', 'V'),
    (48, 'b', 'B'),
    (49, 'n', 'N'),
    (50, 'm', 'M'),
    (51, ',', '<'),
    (52, '.', '>'),
    (53, '/', '?'),
];

/// Keys whose meaning differs on a French AZERTY keyboard
const AZERTY_OVERRIDES: &[(u16, char, char)] = &[
    (2, '&', '1'),
    (3, 'é', '2'),
    (4, '"', '3'),
    (5, '\'', '4'),
    (6, '(', '5'),
    (7, '-', '6'),
    (8, 'è', '7'),
    (9, '_', '8'),
    (10, 'ç', '9'),
    (11, 'à', '0'),
    (12, ')', '°'),
    (13, '=', '+'),
    (16, 'a', 'A'),
    (17, 'z', 'Z'),
    (26, '^', '¨'),
    (27, '$', '£'),
    (30, 'q', 'Q'),
    (39, 'm', 'M'),
    (40, 'ù', '%'),
    (41, '²', '²'),
    (43, '*', 'µ'),
    (44, 'w', 'W'),
    (50, ',', '?'),
    (51, ';', '.'),
    (52, ':', '/'),
    (53, '!', '§'),
];

/// Numeric keypad, identical on every layout
const KEYPAD: &[(u16, char)] = &[
    (71, '7'),
    (72, '8'),
    (73, '9'),
    (74, '-'),
    (75, '4'),
    (76, '5'),
    (77, '6'),
    (78, '+'),
    (79, '1'),
    (80, '2'),
    (81, '3'),
    (82, '0'),
    (83, '.'),
    (55, '*'),
];

type LayoutTable = HashMap<u16, (char, char)>;

static QWERTY_TABLE: Lazy<LayoutTable> = Lazy::new(|| build_table(&[]));
static AZERTY_TABLE: Lazy<LayoutTable> = Lazy::new(|| build_table(AZERTY_OVERRIDES));

fn build_table(overrides: &[(u16, char, char)]) -> LayoutTable {
    let mut table: LayoutTable = QWERTY
        .iter()
        .map(|&(code, plain, shifted)| (code, (plain, shifted)))
        .collect();
    for &(code, plain, shifted) in overrides {
        table.insert(code, (plain, shifted));
    }
    for &(code, c) in KEYPAD {
        table.insert(code, (c, c));
    }
    table
}

/// Physical keyboard layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Qwerty,
    Azerty,
}

impl Layout {
    /// Parse a layout name, `None` for unknown names
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "qwerty" | "us" => Some(Layout::Qwerty),
            "azerty" | "fr" => Some(Layout::Azerty),
            _ => None,
        }
    }

    fn table(&self) -> &'static LayoutTable {
        match self {
            Layout::Qwerty => &QWERTY_TABLE,
            Layout::Azerty => &AZERTY_TABLE,
        }
    }

    /// Character produced by `code`, if any
    pub fn char_for(&self, code: u16, shift: bool, caps_lock: bool) -> Option<char> {
        let &(plain, shifted) = self.table().get(&code)?;
        if plain.is_alphabetic() && plain.is_lowercase() {
            // Caps lock inverts shift for letters only
            Some(if shift != caps_lock { shifted } else { plain })
        } else {
            Some(if shift { shifted } else { plain })
        }
    }
}

/// Translates raw key events into [`KeyEvent`]s
#[derive(Debug, Clone)]
pub struct KeyMapper {
    layout: Layout,
    left_shift: bool,
    right_shift: bool,
    caps_lock: bool,
}

impl KeyMapper {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            left_shift: false,
            right_shift: false,
            caps_lock: false,
        }
    }

    pub fn shift(&self) -> bool {
        self.left_shift || self.right_shift
    }

    pub fn caps_lock(&self) -> bool {
        self.caps_lock
    }

    /// Feed one `EV_KEY` event, returning an event when a key is released
    ///
    /// Modifier changes and key presses return `None`.
    pub fn handle(&mut self, code: u16, value: i32) -> Option<KeyEvent> {
        match code {
            KEY_LEFTSHIFT => {
                self.left_shift = value != KEY_UP;
                return None;
            }
            KEY_RIGHTSHIFT => {
                self.right_shift = value != KEY_UP;
                return None;
            }
            KEY_CAPSLOCK => {
                if value == KEY_DOWN {
                    self.caps_lock = !self.caps_lock;
                }
                return None;
            }
            _ => {}
        }

        if value != KEY_UP {
            return None;
        }

        let event = match code {
            KEY_ENTER | KEY_KPENTER | KEY_SPACE => KeyEvent::Delimiter,
            KEY_VOLUMEUP => KeyEvent::VolumeUp,
            KEY_VOLUMEDOWN => KeyEvent::VolumeDown,
            KEY_MUTE => KeyEvent::Mute,
            _ => match self.layout.char_for(code, self.shift(), self.caps_lock) {
                Some(c) => KeyEvent::Char(c),
                None => {
                    warn!("Unsupported key code: {}", code);
                    KeyEvent::Unmapped
                }
            },
        };
        Some(event)
    }
}
