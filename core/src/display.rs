use core::fmt;

/// Value shown on a three-digit counter, clamped to `000..=999`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThreeDigits(pub i64);

impl ThreeDigits {
    pub fn clamped(self) -> u16 {
        self.0.clamp(0, 999) as u16
    }
}

impl fmt::Display for ThreeDigits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.clamped())
    }
}

impl From<i32> for ThreeDigits {
    fn from(value: i32) -> Self {
        Self(value.into())
    }
}

impl From<u16> for ThreeDigits {
    fn from(value: u16) -> Self {
        Self(value.into())
    }
}
