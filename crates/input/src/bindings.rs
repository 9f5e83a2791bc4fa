use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use ygg_render::CameraMovement;

/// Errors from building key bindings out of configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("unknown binding '{binding}' for key {key}")]
    UnknownBinding { key: String, binding: String },
}

/// Keys the input layer understands, independent of any windowing library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Space,
    LeftShift,
    LeftControl,
    Escape,
    F1,
}

impl Key {
    pub const ALL: [Key; 15] = [
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::Q,
        Key::E,
        Key::Up,
        Key::Down,
        Key::Left,
        Key::Right,
        Key::Space,
        Key::LeftShift,
        Key::LeftControl,
        Key::Escape,
        Key::F1,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Key::W => "W",
            Key::A => "A",
            Key::S => "S",
            Key::D => "D",
            Key::Q => "Q",
            Key::E => "E",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Space => "Space",
            Key::LeftShift => "LeftShift",
            Key::LeftControl => "LeftControl",
            Key::Escape => "Escape",
            Key::F1 => "F1",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Key {
    type Err = InputError;

    /// Case-insensitive key name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InputError::UnknownKey(s.to_string()))
    }
}

/// What a key does while held or when pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    /// Continuous movement while the key is held.
    Move(CameraMovement),
    ToggleOverlay,
    Quit,
}

impl Binding {
    fn parse(key: Key, s: &str) -> Result<Self, InputError> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "toggle_overlay" => Ok(Binding::ToggleOverlay),
            "quit" => Ok(Binding::Quit),
            other => CameraMovement::from_name(other)
                .map(Binding::Move)
                .ok_or_else(|| InputError::UnknownBinding {
                    key: key.to_string(),
                    binding: s.to_string(),
                }),
        }
    }
}

/// Key to binding map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: BTreeMap<Key, Binding>,
}

impl Default for KeyBindings {
    /// W/S forward and back, A/D strafe, arrow Up/Down rise and sink,
    /// Escape quits, F1 toggles the overlay.
    fn default() -> Self {
        let map = BTreeMap::from([
            (Key::W, Binding::Move(CameraMovement::Forward)),
            (Key::S, Binding::Move(CameraMovement::Backward)),
            (Key::A, Binding::Move(CameraMovement::Left)),
            (Key::D, Binding::Move(CameraMovement::Right)),
            (Key::Up, Binding::Move(CameraMovement::Up)),
            (Key::Down, Binding::Move(CameraMovement::Down)),
            (Key::Escape, Binding::Quit),
            (Key::F1, Binding::ToggleOverlay),
        ]);
        Self { map }
    }
}

impl KeyBindings {
    /// No keys bound.
    pub fn empty() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Default bindings overridden by `(key name, binding name)` pairs, as read
    /// from a config file. A binding of `none` unbinds the key.
    pub fn from_named<I, K, B>(pairs: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = (K, B)>,
        K: AsRef<str>,
        B: AsRef<str>,
    {
        let mut bindings = Self::default();
        for (key, binding) in pairs {
            let key: Key = key.as_ref().parse()?;
            if binding.as_ref().trim().eq_ignore_ascii_case("none") {
                bindings.unbind(key);
            } else {
                bindings.bind(key, Binding::parse(key, binding.as_ref())?);
            }
        }
        Ok(bindings)
    }

    /// Bind `key`, returning the binding it replaced.
    pub fn bind(&mut self, key: Key, binding: Binding) -> Option<Binding> {
        self.map.insert(key, binding)
    }

    pub fn unbind(&mut self, key: Key) -> Option<Binding> {
        self.map.remove(&key)
    }

    pub fn get(&self, key: Key) -> Option<Binding> {
        self.map.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Key, Binding)> + '_ {
        self.map.iter().map(|(k, b)| (*k, *b))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_all_movements() {
        let bindings = KeyBindings::default();
        let moves: Vec<CameraMovement> = bindings
            .iter()
            .filter_map(|(_, b)| match b {
                Binding::Move(m) => Some(m),
                _ => None,
            })
            .collect();
        for m in CameraMovement::ALL {
            assert!(moves.contains(&m), "{m:?} not bound");
        }
        assert_eq!(bindings.get(Key::W), Some(Binding::Move(CameraMovement::Forward)));
        assert_eq!(bindings.get(Key::Escape), Some(Binding::Quit));
        assert_eq!(bindings.get(Key::Space), None);
    }

    #[test]
    fn key_names_parse_case_insensitively() {
        for key in Key::ALL {
            assert_eq!(key.name().to_lowercase().parse::<Key>(), Ok(key));
        }
        assert_eq!(" space ".parse::<Key>(), Ok(Key::Space));
        assert_eq!(
            "Tab".parse::<Key>(),
            Err(InputError::UnknownKey("Tab".into()))
        );
    }

    #[test]
    fn from_named_overrides_defaults() {
        let bindings = KeyBindings::from_named([
            ("Space", "up"),
            ("LeftControl", "down"),
            ("Up", "none"),
            ("q", "QUIT"),
        ])
        .unwrap();
        assert_eq!(bindings.get(Key::Space), Some(Binding::Move(CameraMovement::Up)));
        assert_eq!(
            bindings.get(Key::LeftControl),
            Some(Binding::Move(CameraMovement::Down))
        );
        assert_eq!(bindings.get(Key::Up), None);
        assert_eq!(bindings.get(Key::Q), Some(Binding::Quit));
        assert_eq!(bindings.get(Key::W), Some(Binding::Move(CameraMovement::Forward)));
    }

    #[test]
    fn from_named_rejects_unknowns() {
        assert_eq!(
            KeyBindings::from_named([("Tab", "forward")]),
            Err(InputError::UnknownKey("Tab".into()))
        );
        assert!(matches!(
            KeyBindings::from_named([("W", "jump")]),
            Err(InputError::UnknownBinding { .. })
        ));
    }

    #[test]
    fn bind_and_unbind() {
        let mut bindings = KeyBindings::empty();
        assert!(bindings.is_empty());
        assert_eq!(bindings.bind(Key::E, Binding::ToggleOverlay), None);
        assert_eq!(
            bindings.bind(Key::E, Binding::Quit),
            Some(Binding::ToggleOverlay)
        );
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.unbind(Key::E), Some(Binding::Quit));
        assert!(bindings.is_empty());
    }
}
