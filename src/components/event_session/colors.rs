/// Event colors supported by the Google Calendar event palette.
///
/// Each color carries a display name, a stable numeric ID understood by the
/// calendar API, and (except `None`) a hex value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventColor {
    Melrose,
    Riverside,
    Mauve,
    Tangerine,
    Dandelion,
    MacAndCheese,
    Turquoise,
    Mercury,
    Blue,
    Green,
    Red,
    #[default]
    None,
}

/// All palette members, in ID order
pub const ALL_COLORS: [EventColor; 12] = [
    EventColor::Melrose,
    EventColor::Riverside,
    EventColor::Mauve,
    EventColor::Tangerine,
    EventColor::Dandelion,
    EventColor::MacAndCheese,
    EventColor::Turquoise,
    EventColor::Mercury,
    EventColor::Blue,
    EventColor::Green,
    EventColor::Red,
    EventColor::None,
];

impl EventColor {
    /// Display name shown in listings and confirmations
    pub fn display_name(&self) -> &'static str {
        match self {
            EventColor::Melrose => "Melrose",
            EventColor::Riverside => "Riverside",
            EventColor::Mauve => "Mauve",
            EventColor::Tangerine => "Tangerine",
            EventColor::Dandelion => "Dandelion",
            EventColor::MacAndCheese => "MacAndCheese",
            EventColor::Turquoise => "Turquoise",
            EventColor::Mercury => "Mercury",
            EventColor::Blue => "Blue",
            EventColor::Green => "Green",
            EventColor::Red => "Red",
            EventColor::None => "None",
        }
    }

    /// Stable numeric ID used by the calendar API's `colorId` field
    pub fn id(&self) -> u8 {
        match self {
            EventColor::Melrose => 1,
            EventColor::Riverside => 2,
            EventColor::Mauve => 3,
            EventColor::Tangerine => 4,
            EventColor::Dandelion => 5,
            EventColor::MacAndCheese => 6,
            EventColor::Turquoise => 7,
            EventColor::Mercury => 8,
            EventColor::Blue => 9,
            EventColor::Green => 10,
            EventColor::Red => 11,
            EventColor::None => 12,
        }
    }

    /// Hex value of the color, if it has one
    pub fn hex(&self) -> Option<&'static str> {
        match self {
            EventColor::Melrose => Some("A4BDFC"),
            EventColor::Riverside => Some("7AE7BF"),
            EventColor::Mauve => Some("DBADFF"),
            EventColor::Tangerine => Some("FF887C"),
            EventColor::Dandelion => Some("FBD75B"),
            EventColor::MacAndCheese => Some("FFB878"),
            EventColor::Turquoise => Some("46D6DB"),
            EventColor::Mercury => Some("E1E1E1"),
            EventColor::Blue => Some("5484ED"),
            EventColor::Green => Some("51B749"),
            EventColor::Red => Some("DC2127"),
            EventColor::None => None,
        }
    }

    /// Whether a token matches any palette member
    pub fn exists(token: &str) -> bool {
        Self::resolve(token).is_some()
    }

    /// Resolve a token against the palette: display name first, then hex
    /// value, then numeric ID, all case-insensitively. Reserved listing
    /// tokens never resolve.
    pub fn resolve(token: &str) -> Option<EventColor> {
        if is_list_request(token) {
            return None;
        }
        let token = token.trim();

        for color in ALL_COLORS {
            if color.display_name().eq_ignore_ascii_case(token) {
                return Some(color);
            }
        }
        for color in ALL_COLORS {
            if let Some(hex) = color.hex() {
                if hex.eq_ignore_ascii_case(token) {
                    return Some(color);
                }
            }
        }
        if let Ok(id) = token.parse::<u8>() {
            for color in ALL_COLORS {
                if color.id() == id {
                    return Some(color);
                }
            }
        }

        None
    }

    /// Resolve a calendar API `colorId` string, e.g. when copying an
    /// existing event. Unknown or absent IDs fall back to `None`.
    pub fn from_color_id(color_id: Option<&str>) -> EventColor {
        color_id
            .and_then(|id| id.parse::<u8>().ok())
            .and_then(|id| ALL_COLORS.into_iter().find(|c| c.id() == id))
            .unwrap_or(EventColor::None)
    }
}

/// Whether the token is the reserved "show me all colors" keyword rather
/// than a color value
pub fn is_list_request(token: &str) -> bool {
    token.eq_ignore_ascii_case("list") || token.eq_ignore_ascii_case("colors")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name() {
        assert_eq!(EventColor::resolve("Melrose"), Some(EventColor::Melrose));
        assert_eq!(EventColor::resolve("melrose"), Some(EventColor::Melrose));
        assert_eq!(EventColor::resolve("MACANDCHEESE"), Some(EventColor::MacAndCheese));
        assert_eq!(EventColor::resolve("none"), Some(EventColor::None));
    }

    #[test]
    fn test_resolve_by_hex() {
        assert_eq!(EventColor::resolve("A4BDFC"), Some(EventColor::Melrose));
        assert_eq!(EventColor::resolve("a4bdfc"), Some(EventColor::Melrose));
        assert_eq!(EventColor::resolve("DC2127"), Some(EventColor::Red));
    }

    #[test]
    fn test_resolve_by_id() {
        assert_eq!(EventColor::resolve("1"), Some(EventColor::Melrose));
        assert_eq!(EventColor::resolve("11"), Some(EventColor::Red));
        assert_eq!(EventColor::resolve("12"), Some(EventColor::None));
        assert_eq!(EventColor::resolve("13"), None);
        assert_eq!(EventColor::resolve("0"), None);
    }

    #[test]
    fn test_reserved_tokens_never_resolve() {
        assert_eq!(EventColor::resolve("list"), None);
        assert_eq!(EventColor::resolve("LIST"), None);
        assert_eq!(EventColor::resolve("colors"), None);
        assert!(!EventColor::exists("list"));
        assert!(is_list_request("Colors"));
        assert!(!is_list_request("blue"));
    }

    #[test]
    fn test_unknown_token() {
        assert_eq!(EventColor::resolve("chartreuse"), None);
        assert_eq!(EventColor::resolve(""), None);
        assert!(!EventColor::exists("chartreuse"));
    }

    #[test]
    fn test_from_color_id() {
        assert_eq!(EventColor::from_color_id(Some("5")), EventColor::Dandelion);
        assert_eq!(EventColor::from_color_id(Some("not a number")), EventColor::None);
        assert_eq!(EventColor::from_color_id(None), EventColor::None);
    }

    #[test]
    fn test_ids_are_unique() {
        for (i, a) in ALL_COLORS.iter().enumerate() {
            for b in &ALL_COLORS[i + 1..] {
                assert_ne!(a.id(), b.id());
            }
        }
    }
}
