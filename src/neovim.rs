//! Neovim under a pty, with an isolated generated config.
//!
//! Mode detection reads the mode message on the rendered screen
//! (`-- INSERT --` and friends), so it is best-effort: it only works while
//! `showmode` is on and nothing overwrites the message line.
//!
//! Queries (buffer lines, cursor, registers, plugin calls) are answered by
//! Neovim itself: a `:lua` command writes the value to a reply file in the
//! session's config dir, which is then read back.

use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

use crate::error::{Result, SessionError};
use crate::keys::Keys;
use crate::session::{poll_until, Session, SessionBuilder, TerminalSession};

const STEP_PAUSE: Duration = Duration::from_millis(50);
const EX_SETTLE: Duration = Duration::from_millis(200);
const STARTUP_SETTLE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    Visual,
    VisualLine,
    VisualBlock,
    Replace,
    Select,
}

impl Mode {
    /// Infer the mode from screen text. Anything without a mode message is
    /// Normal.
    pub fn detect(content: &str) -> Mode {
        let content = content.to_lowercase();
        const MARKERS: [(&str, Mode); 6] = [
            ("-- insert --", Mode::Insert),
            ("-- visual line --", Mode::VisualLine),
            ("-- visual block --", Mode::VisualBlock),
            ("-- visual --", Mode::Visual),
            ("-- replace --", Mode::Replace),
            ("-- select --", Mode::Select),
        ];
        MARKERS
            .iter()
            .find(|(marker, _)| content.contains(marker))
            .map(|(_, mode)| *mode)
            .unwrap_or(Mode::Normal)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Normal => "normal",
            Mode::Insert => "insert",
            Mode::Visual => "visual",
            Mode::VisualLine => "visual line",
            Mode::VisualBlock => "visual block",
            Mode::Replace => "replace",
            Mode::Select => "select",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct NeovimOptions {
    pub program: String,
    /// Plugin directories prepended to `runtimepath`. Missing ones are
    /// skipped.
    pub plugins: Vec<PathBuf>,
    pub init_lua: Option<String>,
    pub init_vim: Option<String>,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub width: u16,
    pub height: u16,
    pub timeout: Duration,
    /// Start with `--clean` (no user config, no user plugins).
    pub clean: bool,
}

impl Default for NeovimOptions {
    fn default() -> Self {
        Self {
            program: "nvim".to_string(),
            plugins: Vec::new(),
            init_lua: None,
            init_vim: None,
            args: Vec::new(),
            env: Vec::new(),
            width: 120,
            height: 40,
            timeout: Duration::from_secs(5),
            clean: true,
        }
    }
}

fn lua_quote(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("'{escaped}'")
}

/// Lua table literal of quoted strings.
fn lua_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| lua_quote(item)).collect();
    format!("{{{}}}", quoted.join(", "))
}

/// One-line Lua chunk that writes the list `list_expr` to `reply`, going
/// through a temporary name so the file never appears half written.
fn reply_script(list_expr: &str, reply: &Path) -> String {
    let partial = reply.with_extension("partial");
    format!(
        "vim.fn.writefile(vim.tbl_map(tostring, {list_expr}), {}); os.rename({}, {})",
        lua_quote(&partial.to_string_lossy()),
        lua_quote(&partial.to_string_lossy()),
        lua_quote(&reply.to_string_lossy()),
    )
}

/// `line` and `col` from a two line reply.
fn parse_cursor(reply: &[String]) -> Result<(usize, usize)> {
    let number = |index: usize| {
        reply
            .get(index)
            .and_then(|value| value.trim().parse::<usize>().ok())
    };
    match (number(0), number(1)) {
        (Some(line), Some(col)) => Ok((line, col)),
        _ => Err(SessionError::UnexpectedReply(format!("cursor position {reply:?}"))),
    }
}

fn parse_count(reply: &str, what: &str) -> Result<usize> {
    reply
        .trim()
        .parse()
        .map_err(|_| SessionError::UnexpectedReply(format!("{what} '{reply}'")))
}

/// Neovim has drawn something: text, or the `~` filler of an empty buffer.
fn startup_screen_ready(content: &str) -> bool {
    !content.trim().is_empty()
}

/// Contents of the generated `init.lua`.
fn init_script(options: &NeovimOptions, plugins: &[PathBuf]) -> String {
    let mut lines = vec![
        "-- generated by ptytest".to_string(),
        "vim.opt.swapfile = false".to_string(),
        "vim.opt.backup = false".to_string(),
        "vim.opt.writebackup = false".to_string(),
        "vim.opt.undofile = false".to_string(),
        "vim.opt.shadafile = 'NONE'".to_string(),
        "vim.opt.updatetime = 100".to_string(),
        "vim.opt.timeoutlen = 300".to_string(),
        "vim.opt.ttimeoutlen = 10".to_string(),
        "vim.opt.lazyredraw = false".to_string(),
        "vim.opt.termguicolors = false".to_string(),
        String::new(),
    ];

    for plugin in plugins {
        let path = plugin.to_string_lossy();
        lines.push(format!("vim.opt.runtimepath:prepend({})", lua_quote(&path)));
    }

    if let Some(init_lua) = &options.init_lua {
        lines.push(String::new());
        lines.push(init_lua.clone());
    }

    if let Some(init_vim) = &options.init_vim {
        lines.push(String::new());
        lines.push(format!("vim.cmd([==[\n{init_vim}\n]==])"));
    }

    if !plugins.is_empty() {
        lines.push(String::new());
        lines.extend(
            [
                "for _, path in ipairs(vim.opt.runtimepath:get()) do",
                "  local dir = path .. '/plugin'",
                "  if vim.fn.isdirectory(dir) == 1 then",
                "    for _, file in ipairs(vim.fn.glob(dir .. '/*.lua', false, true)) do",
                "      dofile(file)",
                "    end",
                "    for _, file in ipairs(vim.fn.glob(dir .. '/*.vim', false, true)) do",
                "      vim.cmd('source ' .. file)",
                "    end",
                "  end",
                "end",
            ]
            .map(str::to_string),
        );
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Plugin paths that exist, with `~` expanded and made absolute.
fn resolve_plugins(plugins: &[PathBuf]) -> Vec<PathBuf> {
    plugins
        .iter()
        .filter_map(|plugin| {
            let expanded = match plugin.strip_prefix("~") {
                Ok(rest) => dirs::home_dir()?.join(rest),
                Err(_) => plugin.clone(),
            };
            match expanded.canonicalize() {
                Ok(path) => Some(path),
                Err(_) => {
                    tracing::debug!(plugin = %plugin.display(), "skipping missing plugin");
                    None
                }
            }
        })
        .collect()
}

pub struct NeovimSession {
    session: Session,
    config_dir: Mutex<Option<TempDir>>,
    replies: AtomicU64,
}

impl NeovimSession {
    pub fn new(options: NeovimOptions) -> Result<Self> {
        let config_dir = tempfile::Builder::new().prefix("ptytest_nvim_").tempdir()?;
        std::fs::create_dir_all(config_dir.path().join("lua"))?;
        std::fs::create_dir_all(config_dir.path().join("plugin"))?;
        let init_file = config_dir.path().join("init.lua");
        let plugins = resolve_plugins(&options.plugins);
        std::fs::write(&init_file, init_script(&options, &plugins))?;

        let mut builder = SessionBuilder::new(options.program.clone())
            .size(options.width, options.height)
            .timeout(options.timeout);
        if options.clean {
            builder = builder.arg("--clean");
        }
        builder = builder
            .arg("-u")
            .arg(init_file.to_string_lossy())
            .args(options.args.iter().cloned());
        for (key, value) in &options.env {
            builder = builder.env(key.clone(), value.clone());
        }

        let nvim = Self {
            session: builder.spawn()?,
            config_dir: Mutex::new(Some(config_dir)),
            replies: AtomicU64::new(0),
        };
        nvim.wait_for_startup(options.timeout);
        Ok(nvim)
    }

    fn wait_for_startup(&self, timeout: Duration) {
        let ready = poll_until(timeout, self.session.poll_interval(), || {
            startup_screen_ready(&self.session.get_content())
        });
        if !ready {
            tracing::debug!("neovim showed nothing before the startup timeout");
        }
        thread::sleep(STARTUP_SETTLE);
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn raw(&self, keys: &str) -> Result<()> {
        self.session.send_raw(keys, Some(STEP_PAUSE))
    }

    /// Run an Ex command (without the leading `:`).
    pub fn ex(&self, command: &str) -> Result<()> {
        self.raw(Keys::ESCAPE)?;
        self.raw(&format!(":{command}"))?;
        self.session.send_raw(Keys::ENTER, Some(EX_SETTLE))
    }

    pub fn lua(&self, code: &str) -> Result<()> {
        self.ex(&format!("lua {code}"))
    }

    /// `:normal!` with `keys`, so user mappings do not apply.
    pub fn normal(&self, keys: &str) -> Result<()> {
        self.ex(&format!("normal! {keys}"))
    }

    /// `feedkeys()` with key notation such as `<leader>ff`; goes through
    /// mappings when `mode` contains `m`.
    pub fn feedkeys(&self, keys: &str, mode: &str) -> Result<()> {
        let escaped = keys.replace('\\', "\\\\").replace('"', "\\\"");
        self.ex(&format!("call feedkeys(\"{escaped}\", \"{mode}\")"))
    }

    pub fn mode(&self) -> Mode {
        Mode::detect(&self.session.get_content())
    }

    pub fn ensure_normal_mode(&self) -> Result<()> {
        self.raw(Keys::ESCAPE)?;
        self.raw(Keys::ESCAPE)
    }

    /// Enter insert mode with `i`, `a`, `I`, `A`, `o` or `O`.
    pub fn enter_insert_mode(&self, position: char) -> Result<()> {
        self.ensure_normal_mode()?;
        self.session
            .send_raw(&position.to_string(), Some(Duration::from_millis(100)))
    }

    /// Type text as-is in the current mode.
    pub fn type_text(&self, text: &str) -> Result<()> {
        self.session.send_raw(text, None)
    }

    pub fn wait_for_mode(&self, mode: Mode, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.session.default_timeout());
        if poll_until(timeout, self.session.poll_interval(), || self.mode() == mode) {
            return Ok(());
        }
        Err(SessionError::Timeout {
            text: format!("{mode} mode"),
            timeout,
            content: self.session.get_content(),
        })
    }

    /// Screen rows of the current buffer: trailing `~` filler and the
    /// command line are dropped.
    pub fn buffer_content(&self) -> String {
        buffer_rows(&self.session.get_screen()).join("\n")
    }

    pub fn edit_file(&self, path: &str) -> Result<()> {
        self.ex(&format!("edit {}", path.replace(' ', "\\ ")))
    }

    pub fn write_file(&self, path: Option<&str>) -> Result<()> {
        match path {
            Some(path) => self.ex(&format!("write {}", path.replace(' ', "\\ "))),
            None => self.ex("write"),
        }
    }

    pub fn split_window(&self, vertical: bool) -> Result<()> {
        self.ex(if vertical { "vsplit" } else { "split" })
    }

    pub fn search(&self, pattern: &str, backward: bool) -> Result<()> {
        self.raw(if backward { "?" } else { "/" })?;
        self.raw(pattern)?;
        self.session
            .send_raw(Keys::ENTER, Some(Duration::from_millis(100)))
    }

    pub fn search_next(&self) -> Result<()> {
        self.normal("n")
    }

    pub fn search_prev(&self) -> Result<()> {
        self.normal("N")
    }

    pub fn clear_search_highlight(&self) -> Result<()> {
        self.ex("nohlsearch")
    }

    /// Evaluate a Lua list expression inside Neovim and read the items
    /// back, one string each.
    fn query_lines(&self, list_expr: &str) -> Result<Vec<String>> {
        let dir = self
            .config_dir
            .lock()
            .as_ref()
            .map(|dir| dir.path().to_path_buf())
            .ok_or(SessionError::ProcessNotRunning)?;
        let id = self.replies.fetch_add(1, Ordering::Relaxed);
        let reply = dir.join(format!("reply-{id}.txt"));

        self.lua(&reply_script(list_expr, &reply))?;
        let timeout = self.session.default_timeout();
        if !poll_until(timeout, self.session.poll_interval(), || reply.exists()) {
            return Err(SessionError::Timeout {
                text: format!("reply to {list_expr}"),
                timeout,
                content: self.session.get_content(),
            });
        }
        let text = std::fs::read_to_string(&reply)?;
        if let Err(err) = std::fs::remove_file(&reply) {
            tracing::debug!(error = %err, "failed to remove neovim reply file");
        }
        Ok(text.lines().map(str::to_string).collect())
    }

    /// Value of a Lua expression, converted with `tostring`. Leaves insert
    /// mode.
    pub fn eval(&self, expr: &str) -> Result<String> {
        let lines = self.query_lines(&format!(
            "vim.split(tostring({expr}), '\\n', {{ plain = true }})"
        ))?;
        Ok(lines.join("\n"))
    }

    /// Lines `start..=end` of the current buffer, 1-indexed; `None` reads to
    /// the last line.
    pub fn buffer_lines(&self, start: usize, end: Option<usize>) -> Result<Vec<String>> {
        let end = end.map_or_else(|| "-1".to_string(), |end| end.to_string());
        self.query_lines(&format!(
            "vim.api.nvim_buf_get_lines(0, {}, {end}, false)",
            start.saturating_sub(1)
        ))
    }

    pub fn current_line(&self) -> Result<String> {
        self.eval("vim.api.nvim_get_current_line()")
    }

    /// Replace the whole buffer and put the cursor on the first line.
    pub fn set_buffer_content(&self, content: &str) -> Result<()> {
        let lines: Vec<&str> = content.split('\n').collect();
        self.lua(&format!(
            "vim.api.nvim_buf_set_lines(0, 0, -1, false, {})",
            lua_list(&lines)
        ))?;
        self.lua("vim.api.nvim_win_set_cursor(0, {1, 0})")
    }

    /// Add `line` after line `after`, or at the end of the buffer.
    pub fn append_line(&self, line: &str, after: Option<usize>) -> Result<()> {
        let at = after.map_or_else(|| "-1".to_string(), |after| after.to_string());
        self.lua(&format!(
            "vim.api.nvim_buf_set_lines(0, {at}, {at}, false, {})",
            lua_list(&[line])
        ))
    }

    /// Cursor as `(line, column)`, both 1-indexed.
    pub fn cursor_position(&self) -> Result<(usize, usize)> {
        let reply = self.query_lines(
            "(function() local c = vim.api.nvim_win_get_cursor(0) return {c[1], c[2] + 1} end)()",
        )?;
        parse_cursor(&reply)
    }

    pub fn set_cursor_position(&self, line: usize, col: usize) -> Result<()> {
        self.ex(&format!("call cursor({line}, {col})"))
    }

    pub fn goto_line(&self, line: usize) -> Result<()> {
        self.ex(&line.to_string())
    }

    pub fn goto_top(&self) -> Result<()> {
        self.normal("gg")
    }

    pub fn goto_bottom(&self) -> Result<()> {
        self.normal("G")
    }

    /// Enter one of the three visual modes from normal mode.
    pub fn enter_visual_mode(&self, mode: Mode) -> Result<()> {
        let key = match mode {
            Mode::Visual => "v",
            Mode::VisualLine => "V",
            Mode::VisualBlock => Keys::CTRL_V,
            other => {
                return Err(SessionError::Assertion(format!("{other} is not a visual mode")));
            }
        };
        self.ensure_normal_mode()?;
        self.session.send_raw(key, Some(Duration::from_millis(100)))
    }

    /// Select the whole buffer linewise.
    pub fn select_all(&self) -> Result<()> {
        self.ensure_normal_mode()?;
        self.session.send_raw("ggVG", Some(Duration::from_millis(100)))
    }

    /// Windows in the current tab.
    pub fn window_count(&self) -> Result<usize> {
        let reply = self.eval("#vim.api.nvim_tabpage_list_wins(0)")?;
        parse_count(&reply, "window count")
    }

    pub fn close_window(&self) -> Result<()> {
        self.ex("close")
    }

    pub fn next_window(&self) -> Result<()> {
        self.ensure_normal_mode()?;
        self.raw(Keys::CTRL_W)?;
        self.raw("w")
    }

    pub fn tab_count(&self) -> Result<usize> {
        let reply = self.eval("#vim.api.nvim_list_tabpages()")?;
        parse_count(&reply, "tab count")
    }

    pub fn new_tab(&self) -> Result<()> {
        self.ex("tabnew")
    }

    pub fn next_tab(&self) -> Result<()> {
        self.ex("tabnext")
    }

    pub fn close_tab(&self) -> Result<()> {
        self.ex("tabclose")
    }

    /// Full path of the current buffer, `None` for an unnamed one.
    pub fn current_filename(&self) -> Result<Option<String>> {
        let name = self.eval("vim.api.nvim_buf_get_name(0)")?;
        Ok(Some(name).filter(|name| !name.is_empty()))
    }

    pub fn register(&self, name: char) -> Result<String> {
        self.eval(&format!("vim.fn.getreg({})", lua_quote(&name.to_string())))
    }

    pub fn set_register(&self, name: char, content: &str) -> Result<()> {
        self.lua(&format!(
            "vim.fn.setreg({}, {})",
            lua_quote(&name.to_string()),
            lua_quote(content)
        ))
    }

    pub fn yank_line(&self) -> Result<()> {
        self.normal("yy")
    }

    /// Put the unnamed register after the cursor, or before it.
    pub fn paste(&self, before: bool) -> Result<()> {
        self.normal(if before { "P" } else { "p" })
    }

    pub fn delete_line(&self) -> Result<()> {
        self.normal("dd")
    }

    pub fn undo(&self) -> Result<()> {
        self.ex("undo")
    }

    pub fn redo(&self) -> Result<()> {
        self.ex("redo")
    }

    pub fn indent_line(&self) -> Result<()> {
        self.normal(">>")
    }

    pub fn unindent_line(&self) -> Result<()> {
        self.normal("<<")
    }

    /// Wait until `require(module)` has happened, i.e. the module is in
    /// `package.loaded`.
    pub fn wait_for_plugin_load(&self, module: &str, timeout: Option<Duration>) -> Result<()> {
        let timeout = timeout.unwrap_or_else(|| self.session.default_timeout());
        let check = format!("package.loaded[{}] ~= nil", lua_quote(module));
        let loaded = poll_until(timeout, self.session.poll_interval(), || {
            self.eval(&check).is_ok_and(|reply| reply == "true")
        });
        if loaded {
            return Ok(());
        }
        Err(SessionError::Timeout {
            text: format!("plugin {module}"),
            timeout,
            content: self.session.get_content(),
        })
    }

    /// `require(module).function(args...)`, returning the result through
    /// `tostring`. `args` are Lua expressions, so strings need quotes.
    pub fn call_plugin_function(
        &self,
        module: &str,
        function: &str,
        args: &[&str],
    ) -> Result<String> {
        self.eval(&format!(
            "require({}).{function}({})",
            lua_quote(module),
            args.join(", ")
        ))
    }

    /// `:doautocmd` for `event`, matched against `pattern` or the current
    /// file name.
    pub fn trigger_autocmd(&self, event: &str, pattern: Option<&str>) -> Result<()> {
        match pattern {
            Some(pattern) => self.ex(&format!("doautocmd {event} {pattern}")),
            None => self.ex(&format!("doautocmd {event}")),
        }
    }

    fn buffer_text(&self) -> Result<String> {
        Ok(self.buffer_lines(1, None)?.join("\n"))
    }

    pub fn assert_buffer_contains(&self, text: &str) -> Result<()> {
        let content = self.buffer_text()?;
        if content.contains(text) {
            return Ok(());
        }
        Err(SessionError::Assertion(format!(
            "buffer does not contain '{text}'\nbuffer:\n{content}"
        )))
    }

    pub fn assert_buffer_not_contains(&self, text: &str) -> Result<()> {
        let content = self.buffer_text()?;
        if !content.contains(text) {
            return Ok(());
        }
        Err(SessionError::Assertion(format!("buffer unexpectedly contains '{text}'")))
    }

    pub fn assert_mode(&self, expected: Mode) -> Result<()> {
        let actual = self.mode();
        if actual == expected {
            return Ok(());
        }
        Err(SessionError::Assertion(format!("expected {expected} mode, got {actual}")))
    }

    /// Check the cursor line, and the column too when given.
    pub fn assert_cursor_at(&self, line: usize, col: Option<usize>) -> Result<()> {
        let (actual_line, actual_col) = self.cursor_position()?;
        let matches = actual_line == line && col.is_none_or(|col| col == actual_col);
        if matches {
            return Ok(());
        }
        let expected = match col {
            Some(col) => format!("({line}, {col})"),
            None => format!("line {line}"),
        };
        Err(SessionError::Assertion(format!(
            "expected cursor at {expected}, got ({actual_line}, {actual_col})"
        )))
    }
}

fn buffer_rows(screen: &[String]) -> Vec<String> {
    let mut rows = screen.to_vec();
    // Command line / mode message.
    if rows.last().is_some() {
        rows.pop();
    }
    while rows
        .last()
        .is_some_and(|row| row.trim().is_empty() || row.trim_start().starts_with('~'))
    {
        rows.pop();
    }
    rows
}

impl TerminalSession for NeovimSession {
    fn send_keys_with(&self, text: &str, delay: Option<Duration>, literal: bool) -> Result<()> {
        self.session.send_keys_with(text, delay, literal)
    }

    fn send_raw(&self, sequence: &str, delay: Option<Duration>) -> Result<()> {
        self.session.send_raw(sequence, delay)
    }

    fn get_content(&self) -> String {
        self.session.get_content()
    }

    /// Quit Neovim politely, then tear down the pty and the config dir.
    fn cleanup(&self) {
        if self.session.is_alive() {
            let quit = self
                .ensure_normal_mode()
                .and_then(|()| self.session.send_raw(":qa!\r", Some(EX_SETTLE)));
            if let Err(err) = quit {
                tracing::debug!(error = %err, "neovim quit keys failed");
            }
        }
        self.session.cleanup();
        if let Some(dir) = self.config_dir.lock().take() {
            if let Err(err) = dir.close() {
                tracing::debug!(error = %err, "failed to remove neovim config dir");
            }
        }
    }

    fn default_timeout(&self) -> Duration {
        self.session.default_timeout()
    }

    fn poll_interval(&self) -> Duration {
        self.session.poll_interval()
    }
}

impl Drop for NeovimSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_modes_from_screen() {
        assert_eq!(Mode::detect("foo\n-- INSERT --"), Mode::Insert);
        assert_eq!(Mode::detect("-- VISUAL LINE --"), Mode::VisualLine);
        assert_eq!(Mode::detect("-- VISUAL BLOCK --"), Mode::VisualBlock);
        assert_eq!(Mode::detect("-- VISUAL --"), Mode::Visual);
        assert_eq!(Mode::detect("-- REPLACE --"), Mode::Replace);
        assert_eq!(Mode::detect("-- SELECT --"), Mode::Select);
        assert_eq!(Mode::detect("~\n~\n"), Mode::Normal);
    }

    #[test]
    fn detection_ignores_case() {
        assert_eq!(Mode::detect("-- insert --"), Mode::Insert);
    }

    #[test]
    fn init_script_has_isolation_settings() {
        let script = init_script(&NeovimOptions::default(), &[]);
        assert!(script.contains("vim.opt.swapfile = false"));
        assert!(script.contains("vim.opt.shadafile = 'NONE'"));
        assert!(script.contains("vim.opt.ttimeoutlen = 10"));
        assert!(!script.contains("runtimepath:prepend"));
    }

    #[test]
    fn init_script_includes_user_config_and_plugins() {
        let options = NeovimOptions {
            init_lua: Some("vim.g.answer = 42".to_string()),
            init_vim: Some("set number".to_string()),
            ..NeovimOptions::default()
        };
        let script = init_script(&options, &[PathBuf::from("/opt/it's")]);
        assert!(script.contains("vim.opt.runtimepath:prepend('/opt/it\\'s')"));
        assert!(script.contains("vim.g.answer = 42"));
        assert!(script.contains("vim.cmd([==[\nset number\n]==])"));
        assert!(script.contains("dofile(file)"));
    }

    #[test]
    fn missing_plugins_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let plugins = vec![dir.path().to_path_buf(), dir.path().join("missing")];
        let resolved = resolve_plugins(&plugins);
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn buffer_rows_drop_filler_and_command_line() {
        let screen: Vec<String> = ["hello", "world", "~", "~", ":w"]
            .iter()
            .map(|row| row.to_string())
            .collect();
        assert_eq!(buffer_rows(&screen), vec!["hello", "world"]);
    }

    #[test]
    fn lua_strings_stay_on_one_line() {
        assert_eq!(lua_quote("a\nb\r"), "'a\\nb\\r'");
        assert_eq!(lua_list(&["x", "it's"]), "{'x', 'it\\'s'}");
        assert_eq!(lua_list(&[]), "{}");
    }

    #[test]
    fn reply_script_renames_into_place() {
        let script = reply_script("{1, 2}", Path::new("/tmp/d/reply-3.txt"));
        assert_eq!(
            script,
            "vim.fn.writefile(vim.tbl_map(tostring, {1, 2}), '/tmp/d/reply-3.partial'); \
             os.rename('/tmp/d/reply-3.partial', '/tmp/d/reply-3.txt')"
        );
        assert!(!script.contains('\n'));
    }

    #[test]
    fn cursor_reply_parsing() {
        let reply = vec!["12".to_string(), "4".to_string()];
        assert_eq!(parse_cursor(&reply).unwrap(), (12, 4));
        assert!(matches!(
            parse_cursor(&["12".to_string()]),
            Err(SessionError::UnexpectedReply(_))
        ));
        assert!(parse_cursor(&["x".to_string(), "1".to_string()]).is_err());
    }

    #[test]
    fn count_reply_parsing() {
        assert_eq!(parse_count("3\n", "tabs").unwrap(), 3);
        let err = parse_count("nil", "tabs").unwrap_err();
        assert!(err.to_string().contains("tabs 'nil'"));
    }

    #[test]
    fn startup_waits_for_any_drawing() {
        assert!(!startup_screen_ready("   \n  \n"));
        assert!(startup_screen_ready("~\n~\n"));
        assert!(startup_screen_ready("hello"));
    }

    #[test]
    fn mode_display() {
        assert_eq!(Mode::VisualBlock.to_string(), "visual block");
    }
}
