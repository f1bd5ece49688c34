//! Keystrokes as the bytes a terminal would send.
//!
//! [`Keys`] holds the common keys. Per-application bindings live in
//! immutable [`KeyMap`]s looked up with [`app`].

mod apps;

pub use apps::{
    goto_line, htop_kill_signal, less_goto_percent, vim_command, APPS, FZF, HTOP, LAZYGIT, LESS,
    NCDU, READLINE, TMUX, VIM,
};

/// Common keys and escape sequences (xterm encoding).
pub struct Keys;

impl Keys {
    pub const ENTER: &'static str = "\r";
    pub const TAB: &'static str = "\t";
    pub const SHIFT_TAB: &'static str = "\x1b[Z";
    pub const ESCAPE: &'static str = "\x1b";
    pub const BACKSPACE: &'static str = "\x7f";
    pub const DELETE: &'static str = "\x1b[3~";
    pub const INSERT: &'static str = "\x1b[2~";
    pub const SPACE: &'static str = " ";

    pub const UP: &'static str = "\x1b[A";
    pub const DOWN: &'static str = "\x1b[B";
    pub const RIGHT: &'static str = "\x1b[C";
    pub const LEFT: &'static str = "\x1b[D";
    pub const CTRL_RIGHT: &'static str = "\x1b[1;5C";
    pub const CTRL_LEFT: &'static str = "\x1b[1;5D";
    pub const HOME: &'static str = "\x1b[H";
    pub const END: &'static str = "\x1b[F";
    pub const PAGE_UP: &'static str = "\x1b[5~";
    pub const PAGE_DOWN: &'static str = "\x1b[6~";

    pub const F1: &'static str = "\x1bOP";
    pub const F2: &'static str = "\x1bOQ";
    pub const F3: &'static str = "\x1bOR";
    pub const F4: &'static str = "\x1bOS";
    pub const F5: &'static str = "\x1b[15~";
    pub const F6: &'static str = "\x1b[17~";
    pub const F7: &'static str = "\x1b[18~";
    pub const F8: &'static str = "\x1b[19~";
    pub const F9: &'static str = "\x1b[20~";
    pub const F10: &'static str = "\x1b[21~";
    pub const F11: &'static str = "\x1b[23~";
    pub const F12: &'static str = "\x1b[24~";

    pub const CTRL_A: &'static str = "\x01";
    pub const CTRL_B: &'static str = "\x02";
    pub const CTRL_C: &'static str = "\x03";
    pub const CTRL_D: &'static str = "\x04";
    pub const CTRL_E: &'static str = "\x05";
    pub const CTRL_F: &'static str = "\x06";
    pub const CTRL_K: &'static str = "\x0b";
    pub const CTRL_L: &'static str = "\x0c";
    pub const CTRL_N: &'static str = "\x0e";
    pub const CTRL_O: &'static str = "\x0f";
    pub const CTRL_P: &'static str = "\x10";
    pub const CTRL_R: &'static str = "\x12";
    pub const CTRL_S: &'static str = "\x13";
    pub const CTRL_T: &'static str = "\x14";
    pub const CTRL_U: &'static str = "\x15";
    pub const CTRL_V: &'static str = "\x16";
    pub const CTRL_W: &'static str = "\x17";
    pub const CTRL_Y: &'static str = "\x19";
    pub const CTRL_Z: &'static str = "\x1a";

    /// F1 through F12 by number.
    pub fn function(n: u8) -> Option<&'static str> {
        const KEYS: [&str; 12] = [
            Keys::F1,
            Keys::F2,
            Keys::F3,
            Keys::F4,
            Keys::F5,
            Keys::F6,
            Keys::F7,
            Keys::F8,
            Keys::F9,
            Keys::F10,
            Keys::F11,
            Keys::F12,
        ];
        KEYS.get(usize::from(n).checked_sub(1)?).copied()
    }
}

/// Ctrl plus `c`.
///
/// Letters and `@[\]^_` map to their C0 control code, `?` to DEL and space
/// to NUL. Anything else has no control form and is returned unchanged.
pub fn ctrl(c: char) -> String {
    let code = match c.to_ascii_uppercase() {
        upper @ ('@'..='_') => upper as u8 & 0x1f,
        '?' => 0x7f,
        ' ' => 0x00,
        _ => return c.to_string(),
    };
    char::from(code).to_string()
}

/// Alt/Meta plus `keys`: ESC followed by the keys.
pub fn meta(keys: &str) -> String {
    format!("{}{}", Keys::ESCAPE, keys)
}

/// A multiplexer chord: `prefix` then `key`.
pub fn prefixed(prefix: &str, key: &str) -> String {
    format!("{prefix}{key}")
}

/// Named key bindings for one application. Immutable and shareable.
#[derive(Debug)]
pub struct KeyMap {
    pub name: &'static str,
    pub description: &'static str,
    entries: &'static [(&'static str, &'static str)],
}

impl KeyMap {
    pub(crate) const fn new(
        name: &'static str,
        description: &'static str,
        entries: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            name,
            description,
            entries,
        }
    }

    /// Sequence bound to `binding`, e.g. `"accept"`.
    pub fn get(&self, binding: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == binding)
            .map(|(_, keys)| *keys)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Key map for `name` (`fzf`, `vim`, `tmux`, ...), case-insensitive.
pub fn app(name: &str) -> Option<&'static KeyMap> {
    APPS.iter()
        .copied()
        .find(|map| map.name.eq_ignore_ascii_case(name))
}

/// Printable form of a key sequence: control bytes as `^X`, ESC as `\e`.
pub fn describe(keys: &str) -> String {
    let mut out = String::with_capacity(keys.len());
    for c in keys.chars() {
        match c {
            '\x1b' => out.push_str("\\e"),
            '\x7f' => out.push_str("^?"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push('^');
                out.push(char::from(c as u8 + 0x40));
            }
            ' ' => out.push_str("<space>"),
            c => out.push(c),
        }
    }
    out
}
