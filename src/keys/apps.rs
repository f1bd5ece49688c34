use super::{KeyMap, Keys};

pub static FZF: KeyMap = KeyMap::new(
    "fzf",
    "fzf fuzzy finder, default bindings",
    &[
        ("up", Keys::UP),
        ("down", Keys::DOWN),
        ("page_up", Keys::PAGE_UP),
        ("page_down", Keys::PAGE_DOWN),
        ("accept", Keys::ENTER),
        ("abort", Keys::CTRL_C),
        ("toggle", Keys::TAB),
        ("toggle_all", Keys::CTRL_T),
        ("toggle_down", "\x0a"),
        ("toggle_up", Keys::CTRL_K),
        ("clear_query", Keys::CTRL_L),
        ("backward_delete_char", Keys::BACKSPACE),
        ("delete_char", Keys::DELETE),
        ("delete_char_eof", Keys::CTRL_D),
        ("backward_kill_word", "\x1b\x7f"),
        ("kill_word", "\x1bd"),
        ("unix_line_discard", Keys::CTRL_U),
        ("kill_line", Keys::CTRL_K),
        ("yank", Keys::CTRL_Y),
        ("previous_history", Keys::CTRL_P),
        ("next_history", Keys::CTRL_N),
        ("toggle_preview", "\x11"),
        ("toggle_sort", Keys::CTRL_O),
    ],
);

pub static VIM: KeyMap = KeyMap::new(
    "vim",
    "vim / neovim normal, insert and window bindings",
    &[
        ("normal_mode", Keys::ESCAPE),
        ("insert", "i"),
        ("append", "a"),
        ("insert_line_start", "I"),
        ("append_line_end", "A"),
        ("open_below", "o"),
        ("open_above", "O"),
        ("replace_mode", "R"),
        ("visual", "v"),
        ("visual_line", "V"),
        ("visual_block", Keys::CTRL_V),
        ("command", ":"),
        ("left", "h"),
        ("down", "j"),
        ("up", "k"),
        ("right", "l"),
        ("word_forward", "w"),
        ("word_backward", "b"),
        ("word_end", "e"),
        ("file_top", "gg"),
        ("file_bottom", "G"),
        ("line_start", "0"),
        ("first_non_blank", "^"),
        ("line_end", "$"),
        ("delete_char", "x"),
        ("delete_line", "dd"),
        ("delete_word", "dw"),
        ("change_word", "cw"),
        ("change_line", "cc"),
        ("yank_line", "yy"),
        ("paste_after", "p"),
        ("paste_before", "P"),
        ("undo", "u"),
        ("redo", Keys::CTRL_R),
        ("search_forward", "/"),
        ("search_backward", "?"),
        ("next_match", "n"),
        ("previous_match", "N"),
        ("write", ":w\r"),
        ("write_quit", ":wq\r"),
        ("quit", ":q\r"),
        ("quit_force", ":q!\r"),
        ("window_next", "\x17w"),
        ("window_previous", "\x17p"),
        ("window_up", "\x17k"),
        ("window_down", "\x17j"),
        ("window_left", "\x17h"),
        ("window_right", "\x17l"),
        ("fold_open", "zo"),
        ("fold_close", "zc"),
        ("fold_toggle", "za"),
        ("insert_one_normal", Keys::CTRL_O),
        ("complete_next", Keys::CTRL_N),
        ("complete_previous", Keys::CTRL_P),
    ],
);

pub static TMUX: KeyMap = KeyMap::new(
    "tmux",
    "tmux default bindings, sent after the prefix",
    &[
        ("prefix", Keys::CTRL_B),
        ("alt_prefix", Keys::CTRL_A),
        ("detach", "d"),
        ("list_sessions", "s"),
        ("list_windows", "w"),
        ("new_window", "c"),
        ("next_window", "n"),
        ("previous_window", "p"),
        ("last_window", "l"),
        ("rename_window", ","),
        ("kill_window", "&"),
        ("split_horizontal", "\""),
        ("split_vertical", "%"),
        ("kill_pane", "x"),
        ("swap_pane_previous", "{"),
        ("swap_pane_next", "}"),
        ("select_pane_up", Keys::UP),
        ("select_pane_down", Keys::DOWN),
        ("select_pane_left", Keys::LEFT),
        ("select_pane_right", Keys::RIGHT),
        ("last_pane", ";"),
        ("zoom_pane", "z"),
        ("copy_mode", "["),
        ("paste_buffer", "]"),
        ("clock", "t"),
        ("list_keys", "?"),
        ("command_prompt", ":"),
    ],
);

pub static LAZYGIT: KeyMap = KeyMap::new(
    "lazygit",
    "lazygit default bindings",
    &[
        ("up", Keys::UP),
        ("down", Keys::DOWN),
        ("quit", "q"),
        ("quit_all", Keys::CTRL_C),
        ("confirm", Keys::ENTER),
        ("cancel", Keys::ESCAPE),
        ("status_panel", "1"),
        ("files_panel", "2"),
        ("branches_panel", "3"),
        ("commits_panel", "4"),
        ("stash_panel", "5"),
        ("next_panel", Keys::TAB),
        ("previous_panel", Keys::SHIFT_TAB),
        ("stage_file", Keys::SPACE),
        ("stage_all", "a"),
        ("commit", "c"),
        ("commit_with_editor", "C"),
        ("amend", "A"),
        ("pull", "p"),
        ("push", "P"),
        ("fetch", "f"),
        ("new_branch", "n"),
        ("delete_branch", "D"),
        ("merge", "m"),
        ("rebase", "r"),
        ("search", "/"),
        ("options", "x"),
        ("toggle_file_tree", "v"),
    ],
);

pub static HTOP: KeyMap = KeyMap::new(
    "htop",
    "htop process viewer",
    &[
        ("up", Keys::UP),
        ("down", Keys::DOWN),
        ("quit", "q"),
        ("help", Keys::F1),
        ("setup", Keys::F2),
        ("search", Keys::F3),
        ("filter", Keys::F4),
        ("tree", Keys::F5),
        ("sort_by", Keys::F6),
        ("nice_minus", Keys::F7),
        ("nice_plus", Keys::F8),
        ("kill", Keys::F9),
        ("quit_f10", Keys::F10),
        ("sort_cpu", "P"),
        ("sort_memory", "M"),
        ("sort_time", "T"),
        ("invert_sort", "I"),
        ("tree_toggle", "t"),
        ("tag", Keys::SPACE),
        ("follow", "F"),
        ("hide_kernel_threads", "K"),
        ("hide_user_threads", "H"),
        ("show_full_path", "p"),
        ("user_filter", "u"),
    ],
);

pub static LESS: KeyMap = KeyMap::new(
    "less",
    "less pager",
    &[
        ("forward_line", Keys::ENTER),
        ("forward_page", Keys::SPACE),
        ("backward_page", "b"),
        ("forward_half", "d"),
        ("backward_half", "u"),
        ("backward_line", "y"),
        ("top", "g"),
        ("bottom", "G"),
        ("search_forward", "/"),
        ("search_backward", "?"),
        ("next_match", "n"),
        ("previous_match", "N"),
        ("next_file", ":n"),
        ("previous_file", ":p"),
        ("file_info", "="),
        ("toggle_line_numbers", "-N"),
        ("chop_long_lines", "-S"),
        ("edit", "v"),
        ("filter", "&"),
        ("help", "h"),
        ("quit", "q"),
    ],
);

pub static NCDU: KeyMap = KeyMap::new(
    "ncdu",
    "ncdu disk usage browser",
    &[
        ("up", Keys::UP),
        ("down", Keys::DOWN),
        ("parent", Keys::LEFT),
        ("enter_dir", Keys::RIGHT),
        ("open", Keys::ENTER),
        ("delete", "d"),
        ("info", "i"),
        ("shell", "b"),
        ("sort_name", "n"),
        ("sort_size", "s"),
        ("sort_items", "C"),
        ("sort_mtime", "M"),
        ("toggle_graph", "g"),
        ("toggle_hidden", "e"),
        ("toggle_apparent_size", "a"),
        ("recalculate", "r"),
        ("help", "?"),
        ("quit", "q"),
    ],
);

pub static READLINE: KeyMap = KeyMap::new(
    "readline",
    "emacs-mode line editing (bash, zsh, python REPL)",
    &[
        ("line_start", Keys::CTRL_A),
        ("line_end", Keys::CTRL_E),
        ("char_back", Keys::CTRL_B),
        ("char_forward", Keys::CTRL_F),
        ("word_back", "\x1bb"),
        ("word_forward", "\x1bf"),
        ("delete_char", Keys::CTRL_D),
        ("kill_line", Keys::CTRL_K),
        ("kill_to_start", Keys::CTRL_U),
        ("kill_word_back", Keys::CTRL_W),
        ("kill_word", "\x1bd"),
        ("yank", Keys::CTRL_Y),
        ("transpose_chars", Keys::CTRL_T),
        ("clear_screen", Keys::CTRL_L),
        ("history_previous", Keys::CTRL_P),
        ("history_next", Keys::CTRL_N),
        ("reverse_search", Keys::CTRL_R),
        ("forward_search", Keys::CTRL_S),
        ("undo", "\x1f"),
        ("interrupt", Keys::CTRL_C),
        ("eof", Keys::CTRL_D),
        ("suspend", Keys::CTRL_Z),
    ],
);

/// Every built-in application map.
pub static APPS: &[&KeyMap] = &[&FZF, &VIM, &TMUX, &LAZYGIT, &HTOP, &LESS, &NCDU, &READLINE];

/// `:command` followed by Enter.
pub fn vim_command(command: &str) -> String {
    format!(":{command}\r")
}

/// Vim `NG`: jump to line `n`.
pub fn goto_line(line: u32) -> String {
    format!("{line}G")
}

/// less `N%`-style jump (`Np`).
pub fn less_goto_percent(percent: u8) -> String {
    format!("{}p", percent.min(100))
}

/// Key htop's kill menu uses for signal `signal` (1..=31).
pub fn htop_kill_signal(signal: u8) -> Option<char> {
    const KEYS: &[u8; 31] = b"1234567890abcdefghijklmnopqrstu";
    KEYS.get(usize::from(signal).checked_sub(1)?).map(|&key| char::from(key))
}
