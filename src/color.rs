use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0., 0., 0., 0.);

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Color {
        Color { r, g, b, a }
    }

    /// Packs the color into the 0xAARRGGBB integer form used at interop boundaries.
    pub fn to_argb(self) -> u32 {
        let channel = |c: f64| (c.max(0.).min(1.) * 255.).round() as u32;
        channel(self.a) << 24 | channel(self.r) << 16 | channel(self.g) << 8 | channel(self.b)
    }
}

#[test]
fn test_to_argb() {
    assert_eq!(Color::rgba(1., 0., 0., 1.).to_argb(), 0xFFFF_0000);
    assert_eq!(Color::TRANSPARENT.to_argb(), 0);
}
