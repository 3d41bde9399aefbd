use strum::{Display, EnumString};

/// Arrow keys that step a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Key {
    /// Increment
    Up,
    /// Decrement
    Down,
}

/// Modifier held while pressing a [`Key`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Modifier {
    /// Step by one
    #[default]
    None,
    /// Double or halve
    Control,
    /// Step down by ten, up by one
    Shift,
}

/// A key press on a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key pressed
    pub key: Key,
    /// The modifier held
    pub modifier: Modifier,
}

impl KeyEvent {
    /// Creates a new [`KeyEvent`]
    #[must_use]
    pub const fn new(key: Key, modifier: Modifier) -> Self {
        Self { key, modifier }
    }
}

const MULTIPLIER: i64 = 2;
const SHIFT_STEP: i64 = 10;

/// Returns `value` after applying `event`
///
/// | key  | none          | control | shift |
/// |------|---------------|---------|-------|
/// | up   | +1            | x2      | +1    |
/// | down | -1 if above 0 | /2      | -10   |
///
/// Halving rounds toward negative infinity. Results are not range checked.
#[must_use]
pub const fn step_value(value: i64, event: KeyEvent) -> i64 {
    match (event.key, event.modifier) {
        (Key::Up, Modifier::Control) => value.saturating_mul(MULTIPLIER),
        (Key::Down, Modifier::Control) => value.div_euclid(MULTIPLIER),
        (Key::Down, Modifier::Shift) => value.saturating_sub(SHIFT_STEP),
        (Key::Up, Modifier::None | Modifier::Shift) => value.saturating_add(1),
        (Key::Down, Modifier::None) if value > 0 => value - 1,
        (Key::Down, Modifier::None) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(value: i64, key: Key, modifier: Modifier) -> i64 {
        step_value(value, KeyEvent::new(key, modifier))
    }

    #[test]
    fn plain_arrows_step_by_one() {
        assert_eq!(press(16, Key::Up, Modifier::None), 17);
        assert_eq!(press(16, Key::Down, Modifier::None), 15);
        assert_eq!(press(0, Key::Down, Modifier::None), 0);
    }

    #[test]
    fn control_doubles_and_halves() {
        assert_eq!(press(16, Key::Up, Modifier::Control), 32);
        assert_eq!(press(17, Key::Down, Modifier::Control), 8);
        assert_eq!(press(-3, Key::Down, Modifier::Control), -2);
    }

    #[test]
    fn shift_only_speeds_up_going_down() {
        assert_eq!(press(16, Key::Up, Modifier::Shift), 17);
        assert_eq!(press(5, Key::Down, Modifier::Shift), -5);
    }

    #[test]
    fn parses_names() {
        assert_eq!("UP".parse::<Key>().unwrap(), Key::Up);
        assert_eq!("control".parse::<Modifier>().unwrap(), Modifier::Control);
    }
}
