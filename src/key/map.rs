//! Raw key code to [`KeyId`] mapping.

use super::event::KeyId;
use std::collections::HashMap;

/// Maps raw virtual key codes to stable key identifiers.
///
/// Codes with no mapping return `None` and are ignored by the multiplexer.
/// Implementations must never produce the wildcard identifier; the
/// multiplexer treats such a result as unmapped.
pub trait KeyMap {
    /// Identify the key behind a raw code.
    fn identify(&self, code: u32) -> Option<KeyId>;
}

impl<F> KeyMap for F
where
    F: Fn(u32) -> Option<KeyId>,
{
    fn identify(&self, code: u32) -> Option<KeyId> {
        self(code)
    }
}

/// Default key map over DOM virtual key codes.
///
/// Printable keys map to their US-layout glyph (`"A"`, `"7"`, `";"`), the rest
/// to bracketed names (`"<space>"`, `"<left>"`, `"<num-4>"`). Function keys
/// are `"F1"` to `"F24"`.
#[derive(Debug, Clone)]
pub struct VirtualKeyMap {
    names: HashMap<u32, KeyId>,
}

const NAMED: &[(u32, &str)] = &[
    (3, "<cancel>"),
    (8, "<backspace>"),
    (9, "<tab>"),
    (12, "<clear>"),
    (13, "<enter>"),
    (16, "<shift>"),
    (17, "<control>"),
    (18, "<alt>"),
    (19, "<pause>"),
    (20, "<caps-lock>"),
    (27, "<escape>"),
    (32, "<space>"),
    (33, "<page-up>"),
    (34, "<page-down>"),
    (35, "<end>"),
    (36, "<home>"),
    (37, "<left>"),
    (38, "<up>"),
    (39, "<right>"),
    (40, "<down>"),
    (41, "<select>"),
    (42, "<print>"),
    (43, "<execute>"),
    (44, "<snapshot>"),
    (45, "<insert>"),
    (46, "<delete>"),
    (47, "<help>"),
    (91, "<meta>"),
    (92, "<meta>"),
    (93, "<menu>"),
    (106, "<num-multiply>"),
    (107, "<num-plus>"),
    (108, "<num-enter>"),
    (109, "<num-minus>"),
    (110, "<num-decimal>"),
    (111, "<num-divide>"),
    (144, "<num-lock>"),
    (145, "<scroll-lock>"),
    (186, ";"),
    (187, "="),
    (188, ","),
    (189, "-"),
    (190, "."),
    (191, "/"),
    (192, "`"),
    (219, "["),
    (220, "\\"),
    (221, "]"),
    (222, "'"),
];

impl VirtualKeyMap {
    /// Build the standard table.
    pub fn new() -> Self {
        let mut names = HashMap::with_capacity(128);

        for &(code, name) in NAMED {
            names.insert(code, KeyId::new(name));
        }
        for c in b'0'..=b'9' {
            names.insert(u32::from(c), KeyId::new((c as char).to_string()));
            names.insert(
                u32::from(c - b'0') + 96,
                KeyId::new(format!("<num-{}>", c as char)),
            );
        }
        for c in b'A'..=b'Z' {
            names.insert(u32::from(c), KeyId::new((c as char).to_string()));
        }
        for n in 1..=24u32 {
            names.insert(111 + n, KeyId::new(format!("F{n}")));
        }

        Self { names }
    }

    /// Override or add a mapping, e.g. for a non-US layout.
    ///
    /// Returns the previous identifier for `code`, if any. The wildcard is
    /// rejected and leaves the table untouched.
    pub fn insert(&mut self, code: u32, id: impl Into<KeyId>) -> Option<KeyId> {
        let id = id.into();
        if id.is_wildcard() {
            return None;
        }
        self.names.insert(code, id)
    }

    /// Drop a mapping so the code becomes unrecognised.
    pub fn remove(&mut self, code: u32) -> Option<KeyId> {
        self.names.remove(&code)
    }

    /// Number of mapped codes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for VirtualKeyMap {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyMap for VirtualKeyMap {
    fn identify(&self, code: u32) -> Option<KeyId> {
        self.names.get(&code).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_and_digits() {
        let map = VirtualKeyMap::new();
        assert_eq!(map.identify(65), Some(KeyId::new("A")));
        assert_eq!(map.identify(90), Some(KeyId::new("Z")));
        assert_eq!(map.identify(48), Some(KeyId::new("0")));
        assert_eq!(map.identify(101), Some(KeyId::new("<num-5>")));
    }

    #[test]
    fn test_named_and_function_keys() {
        let map = VirtualKeyMap::new();
        assert_eq!(map.identify(32), Some(KeyId::new("<space>")));
        assert_eq!(map.identify(37), Some(KeyId::new("<left>")));
        assert_eq!(map.identify(112), Some(KeyId::new("F1")));
        assert_eq!(map.identify(135), Some(KeyId::new("F24")));
    }

    #[test]
    fn test_help_has_one_code() {
        let map = VirtualKeyMap::new();
        assert_eq!(map.identify(47), Some(KeyId::new("<help>")));
        assert_eq!(map.identify(6), None);

        let help = (0..=255).filter(|&c| map.identify(c) == Some(KeyId::new("<help>"))).count();
        assert_eq!(help, 1);
    }

    #[test]
    fn test_unmapped_code() {
        let map = VirtualKeyMap::new();
        assert_eq!(map.identify(0), None);
        assert_eq!(map.identify(255), None);
    }

    #[test]
    fn test_never_maps_wildcard() {
        let mut map = VirtualKeyMap::new();
        assert!((0..=255).filter_map(|c| map.identify(c)).all(|id| !id.is_wildcard()));

        assert_eq!(map.insert(7, "*"), None);
        assert_eq!(map.identify(7), None);
    }

    #[test]
    fn test_override() {
        let mut map = VirtualKeyMap::new();
        let previous = map.insert(81, "<a-azerty>");
        assert_eq!(previous, Some(KeyId::new("Q")));
        assert_eq!(map.identify(81), Some(KeyId::new("<a-azerty>")));

        map.remove(81);
        assert_eq!(map.identify(81), None);
    }

    #[test]
    fn test_closure_key_map() {
        let map = |code: u32| (code == 1).then(|| KeyId::new("one"));
        assert_eq!(map.identify(1), Some(KeyId::new("one")));
        assert_eq!(map.identify(2), None);
    }
}
