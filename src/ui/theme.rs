use ratatui::style::Color;

pub const ACCENT: Color = Color::Rgb(0x5f, 0xaf, 0xd7);
pub const GLOBAL_BORDER: Color = Color::Rgb(0x40, 0x40, 0x40);
pub const HEADER_TEXT: Color = Color::Rgb(0xe5, 0xe5, 0xe5);
pub const HEADER_SEPARATOR: Color = Color::Rgb(0x6b, 0x72, 0x80);
pub const STATUS_OK: Color = Color::Rgb(0x22, 0xc5, 0x5e);
pub const STATUS_STOPPED: Color = Color::Rgb(0xef, 0x44, 0x44);
pub const PLACEHOLDER: Color = Color::Rgb(0x80, 0x80, 0x80);
