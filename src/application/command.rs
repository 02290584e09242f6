/// Operator commands, one byte each on the serial console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `t`: start automatic mode.
    Start,
    /// `x`: stop everything.
    Stop,
    /// `w`
    Forward,
    /// `s`
    Backward,
    /// `a`
    Left,
    /// `d`
    Right,
    /// `r`: center the pan actuator.
    CenterPan,
}

impl Command {
    /// Decodes one received byte, ignoring case. Unknown bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_lowercase() {
            b't' => Some(Command::Start),
            b'x' => Some(Command::Stop),
            b'w' => Some(Command::Forward),
            b's' => Some(Command::Backward),
            b'a' => Some(Command::Left),
            b'd' => Some(Command::Right),
            b'r' => Some(Command::CenterPan),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_both_cases() {
        assert_eq!(Command::from_byte(b't'), Some(Command::Start));
        assert_eq!(Command::from_byte(b'T'), Some(Command::Start));
        assert_eq!(Command::from_byte(b'S'), Some(Command::Backward));
        assert_eq!(Command::from_byte(b'r'), Some(Command::CenterPan));
    }

    #[test]
    fn ignores_everything_else() {
        for byte in [b'q', b' ', b'\r', b'\n', 0, 0xFF] {
            assert_eq!(Command::from_byte(byte), None);
        }
    }
}
