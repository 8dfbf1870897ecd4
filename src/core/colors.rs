use serde::{Deserialize, Serialize};

/// An RGBA color with normalized float channels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from a packed `0xAARRGGBB` value
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0), channel(24))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channel layout expected by the shaders
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Palette for the globe surfaces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobeColors {
    pub land: Color,
    pub ocean: Color,
    pub contour: Color,
}

impl GlobeColors {
    /// Contour lines default to the ocean color, which hides them
    pub fn new(land: Color, ocean: Color) -> Self {
        Self {
            land,
            ocean,
            contour: ocean,
        }
    }

    pub fn with_contour(mut self, contour: Color) -> Self {
        self.contour = contour;
        self
    }
}

impl Default for GlobeColors {
    fn default() -> Self {
        Self::new(Color::from_argb(0xFF29_4D73), Color::from_argb(0xFF19_2E45))
    }
}

/// Palette for a single location marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationMarkerColors {
    pub center: Color,
    pub ring_border: Color,
    pub shadow: Color,
    /// Translucent halo around the marker, `None` draws no halo
    pub perimeter: Option<Color>,
}

impl LocationMarkerColors {
    pub fn new(center: Color) -> Self {
        Self {
            center,
            ring_border: Color::WHITE,
            shadow: Color::BLACK.with_alpha(0.55),
            perimeter: Some(center.with_alpha(0.4)),
        }
    }

    pub fn without_perimeter(mut self) -> Self {
        self.perimeter = None;
        self
    }

    pub fn with_ring_border(mut self, ring_border: Color) -> Self {
        self.ring_border = ring_border;
        self
    }
}

impl Default for LocationMarkerColors {
    fn default() -> Self {
        Self::new(Color::from_argb(0xFF44_AD4D))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argb() {
        let color = Color::from_argb(0x80FF_0000);
        assert_eq!(color.r, 1.0);
        assert_eq!(color.g, 0.0);
        assert!((color.a - 128.0 / 255.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_contour_defaults_to_ocean() {
        let colors = GlobeColors::default();
        assert_eq!(colors.contour, colors.ocean);
        assert_ne!(colors.land, colors.ocean);
    }

    #[test]
    fn test_marker_colors_perimeter() {
        let colors = LocationMarkerColors::new(Color::WHITE);
        assert_eq!(colors.perimeter.map(|c| c.a), Some(0.4));
        assert!(colors.without_perimeter().perimeter.is_none());
    }
}
