use ptytest::keys::{self, ctrl, meta, prefixed, Keys, APPS, TMUX};

#[test]
fn base_table_uses_xterm_sequences() {
    assert_eq!(Keys::ENTER, "\r");
    assert_eq!(Keys::ESCAPE, "\x1b");
    assert_eq!(Keys::UP, "\x1b[A");
    assert_eq!(Keys::BACKSPACE, "\x7f");
    assert_eq!(Keys::SHIFT_TAB, "\x1b[Z");
    assert_eq!(Keys::F1, "\x1bOP");
    assert_eq!(Keys::function(5), Some("\x1b[15~"));
    assert_eq!(Keys::function(13), None);
}

#[test]
fn control_and_meta_helpers() {
    assert_eq!(ctrl('a'), Keys::CTRL_A);
    assert_eq!(meta("f"), "\x1bf");
    assert_eq!(prefixed(TMUX.get("prefix").unwrap(), "c"), "\x02c");
}

#[test]
fn app_lookup_is_case_insensitive() {
    assert_eq!(keys::app("VIM").map(|map| map.name), Some("vim"));
    assert!(keys::app("emacs").is_none());
    for map in APPS {
        assert!(keys::app(map.name).is_some());
    }
}

#[test]
fn describe_makes_sequences_printable() {
    assert_eq!(keys::describe("\x1b[A"), "\\e[A");
    assert_eq!(keys::describe("\x03"), "^C");
    assert_eq!(keys::describe(":wq\r"), ":wq\\r");
    assert_eq!(keys::describe(" "), "<space>");
}

#[test]
fn maps_iterate_in_declaration_order() {
    let vim = keys::app("vim").unwrap();
    let first = vim.iter().next().unwrap();
    assert_eq!(first, ("normal_mode", Keys::ESCAPE));
    assert_eq!(vim.names().count(), vim.len());
}
