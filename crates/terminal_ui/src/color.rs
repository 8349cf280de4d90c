/// The sixteen console colors the palette draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    #[default]
    Black,
    DarkBlue,
    DarkGreen,
    DarkCyan,
    DarkRed,
    DarkMagenta,
    DarkYellow,
    Gray,
    DarkGray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl Color {
    /// Parses a color name, accepting `dark_blue`, `dark-blue` and `darkblue`.
    pub fn from_name(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "black" => Some(Self::Black),
            "darkblue" => Some(Self::DarkBlue),
            "darkgreen" => Some(Self::DarkGreen),
            "darkcyan" => Some(Self::DarkCyan),
            "darkred" => Some(Self::DarkRed),
            "darkmagenta" => Some(Self::DarkMagenta),
            "darkyellow" => Some(Self::DarkYellow),
            "gray" | "grey" => Some(Self::Gray),
            "darkgray" | "darkgrey" => Some(Self::DarkGray),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "cyan" => Some(Self::Cyan),
            "red" => Some(Self::Red),
            "magenta" => Some(Self::Magenta),
            "yellow" => Some(Self::Yellow),
            "white" => Some(Self::White),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::DarkBlue => "dark_blue",
            Self::DarkGreen => "dark_green",
            Self::DarkCyan => "dark_cyan",
            Self::DarkRed => "dark_red",
            Self::DarkMagenta => "dark_magenta",
            Self::DarkYellow => "dark_yellow",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Cyan => "cyan",
            Self::Red => "red",
            Self::Magenta => "magenta",
            Self::Yellow => "yellow",
            Self::White => "white",
        }
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        use crossterm::style::Color as Ct;
        match color {
            Color::Black => Ct::Black,
            Color::DarkBlue => Ct::DarkBlue,
            Color::DarkGreen => Ct::DarkGreen,
            Color::DarkCyan => Ct::DarkCyan,
            Color::DarkRed => Ct::DarkRed,
            Color::DarkMagenta => Ct::DarkMagenta,
            Color::DarkYellow => Ct::DarkYellow,
            Color::Gray => Ct::Grey,
            Color::DarkGray => Ct::DarkGrey,
            Color::Blue => Ct::Blue,
            Color::Green => Ct::Green,
            Color::Cyan => Ct::Cyan,
            Color::Red => Ct::Red,
            Color::Magenta => Ct::Magenta,
            Color::Yellow => Ct::Yellow,
            Color::White => Ct::White,
        }
    }
}
