//! `scale,[width],[height]` output size descriptor.

use std::str::FromStr;

use crate::core::{
    constants::{DEFAULT_HEIGHT, DEFAULT_SCALE, DEFAULT_WIDTH, MAX_PIXELS},
    error::ConfigError,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputSize {
    pub scale: f64,
    pub width: u32,
    pub height: u32,
}

impl Default for OutputSize {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl OutputSize {
    /// Final image dimensions in pixels.
    #[inline]
    pub fn pixels(&self) -> (u32, u32) {
        (self.px(f64::from(self.width)), self.px(f64::from(self.height)))
    }

    /// Scale an unscaled pixel length, never below 1.
    #[inline]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn px(&self, v: f64) -> u32 {
        (v * self.scale).round().max(1.0) as u32
    }

    /// Scale a font size.
    #[inline]
    pub fn pt(&self, v: f64) -> f64 {
        v * self.scale
    }
}

impl FromStr for OutputSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = |reason| ConfigError::InvalidSize {
            text: s.to_owned(),
            reason,
        };
        let mut out = Self::default();
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() > 3 {
            return Err(bad("expected at most three fields: scale,width,height"));
        }

        if let Some(f) = fields.first().filter(|f| !f.is_empty()) {
            out.scale = f.parse().map_err(|_| bad("scale is not a number"))?;
            if !out.scale.is_finite() || out.scale <= 0.0 {
                return Err(bad("scale must be positive"));
            }
        }
        let dim = |f: &str, what| -> Result<u32, ConfigError> {
            match f.parse::<u32>() {
                Ok(0) | Err(_) => Err(bad(what)),
                Ok(v) => Ok(v),
            }
        };
        if let Some(f) = fields.get(1).filter(|f| !f.is_empty()) {
            out.width = dim(f, "width must be a positive integer")?;
        }
        if let Some(f) = fields.get(2).filter(|f| !f.is_empty()) {
            out.height = dim(f, "height must be a positive integer")?;
        }
        let area = f64::from(out.width) * out.scale * f64::from(out.height) * out.scale;
        if area > MAX_PIXELS {
            return Err(bad("image would exceed 64 megapixels"));
        }
        Ok(out)
    }
}
