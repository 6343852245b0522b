use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`; the leading `#` is optional.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.trim();
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return None;
        }
        let parse_pair = |index: usize| u8::from_str_radix(&digits[index..index + 2], 16).ok();
        match digits.len() {
            6 => Some(Self::rgb(parse_pair(0)?, parse_pair(2)?, parse_pair(4)?)),
            8 => Some(Self::rgba(
                parse_pair(0)?,
                parse_pair(2)?,
                parse_pair(4)?,
                parse_pair(6)?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 0xFF {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Channels as `0.0..=1.0` fractions, in cairo's `set_source_rgba` order.
    pub fn to_unit_rgba(self) -> (f64, f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
            f64::from(self.a) / 255.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_hex_accepts_rgb_and_rgba_forms() {
        assert_eq!(Color::from_hex("#2d3748"), Some(Color::rgb(0x2d, 0x37, 0x48)));
        assert_eq!(Color::from_hex("e2e8f0"), Some(Color::rgb(0xe2, 0xe8, 0xf0)));
        assert_eq!(
            Color::from_hex("#ffffff66"),
            Some(Color::rgba(0xff, 0xff, 0xff, 0x66))
        );
    }

    #[test]
    fn from_hex_rejects_malformed_values() {
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gg0000"), None);
        assert_eq!(Color::from_hex("#가나다"), None);
        assert_eq!(Color::from_hex("#+f+f+f"), None);
        assert_eq!(Color::from_hex("+fffffff"), None);
    }

    #[test]
    fn to_hex_omits_opaque_alpha() {
        assert_eq!(Color::rgb(0x13, 0x4e, 0x5e).to_hex(), "#134e5e");
        assert_eq!(Color::rgba(0xff, 0xff, 0xff, 0x1a).to_hex(), "#ffffff1a");
    }
}
