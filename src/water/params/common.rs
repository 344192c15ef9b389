use serde::{Deserialize, Deserializer, Serialize};

/// Case, separator, and whitespace insensitive parameter key.
pub fn normalize_key(value: &str) -> String {
    value
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' ' | '.'))
        .collect()
}

/// RGB color as stored in presets. Channels may be 0-1 or 0-255 until
/// [`Rgb::normalized`] runs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rgb(pub [f32; 3]);

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b])
    }

    /// 0-255 channels are detected by any channel above 1.
    pub fn normalized(self) -> Self {
        let max = self.0.iter().fold(0.0f32, |a, &c| a.max(c));
        let scale = if max > 1.0 { 1.0 / 255.0 } else { 1.0 };
        Self(self.0.map(|c| {
            let v = c * scale;
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                0.0
            }
        }))
    }

    pub fn r(&self) -> f32 {
        self.0[0]
    }

    pub fn g(&self) -> f32 {
        self.0[1]
    }

    pub fn b(&self) -> f32 {
        self.0[2]
    }

    fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().trim_start_matches('#').trim_start_matches("0x");
        if hex.len() != 6 {
            return None;
        }
        let packed = u32::from_str_radix(hex, 16).ok()?;
        Some(Self::from_packed(packed))
    }

    /// 0xRRGGBB, already scaled to 0..1 so `normalized` leaves it alone.
    fn from_packed(packed: u32) -> Self {
        let channel = |shift: u32| ((packed >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RgbRepr {
    Array([f32; 3]),
    Object { r: f32, g: f32, b: f32 },
    Packed(u32),
    Hex(String),
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RgbRepr::deserialize(deserializer)? {
            RgbRepr::Array(c) => Ok(Rgb(c)),
            RgbRepr::Object { r, g, b } => Ok(Rgb::new(r, g, b)),
            RgbRepr::Packed(p) => Ok(Rgb::from_packed(p)),
            RgbRepr::Hex(s) => Rgb::from_hex(&s)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{s}'"))),
        }
    }
}
