/// Straight-alpha RGBA color with components in `[0, 1]`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn transparent() -> Self {
        Self {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 0.0,
        }
    }

    pub fn from_srgb_u8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` (leading `#` optional) and the
    /// handful of CSS names that show up in styling callbacks.
    pub fn parse(input: &str) -> Option<Color> {
        let s = input.trim();
        match s.to_ascii_lowercase().as_str() {
            "white" => return Some(Self::from_srgb_u8(255, 255, 255, 255)),
            "black" => return Some(Self::from_srgb_u8(0, 0, 0, 255)),
            "red" => return Some(Self::from_srgb_u8(255, 0, 0, 255)),
            "green" => return Some(Self::from_srgb_u8(0, 128, 0, 255)),
            "blue" => return Some(Self::from_srgb_u8(0, 0, 255, 255)),
            "gray" | "grey" => return Some(Self::from_srgb_u8(128, 128, 128, 255)),
            _ => {}
        }

        let hex = s.strip_prefix('#').unwrap_or(s);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        match hex.len() {
            3 => {
                let nibble = |i| u8::from_str_radix(&hex[i..i + 1], 16).ok();
                let (r, g, b) = (nibble(0)?, nibble(1)?, nibble(2)?);
                Some(Self::from_srgb_u8(r * 17, g * 17, b * 17, 255))
            }
            6 | 8 => {
                let byte = |i| u8::from_str_radix(&hex[i..i + 2], 16).ok();
                let (r, g, b) = (byte(0)?, byte(2)?, byte(4)?);
                let a = if hex.len() == 8 { byte(6)? } else { 255 };
                Some(Self::from_srgb_u8(r, g, b, a))
            }
            _ => None,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with alpha forced to 1.
    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }
}
