use locate_core::Keypoint;

/// Corner found on one pyramid level, in that level's pixel grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredKeypoint {
    pub x: usize,
    pub y: usize,
    pub response: f32,
}

/// Scale information for pyramid levels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLevel {
    pub level: usize,
    pub scale: f32,
    pub width: usize,
    pub height: usize,
}

impl ScaleLevel {
    /// Map a pixel of this level to base-level coordinates.
    ///
    /// Pixel centers line up the way `imageops::resize` samples them, so
    /// level pixel `x` covers base position `(x + 0.5) * sx - 0.5`.
    pub fn to_base(&self, x: usize, y: usize, (base_w, base_h): (usize, usize)) -> (f32, f32) {
        if self.level == 0 {
            return (x as f32, y as f32);
        }
        let sx = base_w as f32 / self.width as f32;
        let sy = base_h as f32 / self.height as f32;
        ((x as f32 + 0.5) * sx - 0.5, (y as f32 + 0.5) * sy - 0.5)
    }
}

/// Detected keypoint together with its integer position on its own level.
///
/// Descriptors are sampled on the level image, so the level position is kept
/// exactly instead of being recovered from the rescaled level-0 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PyramidKeypoint {
    pub keypoint: Keypoint,
    pub level_x: usize,
    pub level_y: usize,
}

impl PyramidKeypoint {
    pub fn level(&self) -> usize {
        self.keypoint.octave as usize
    }
}

/// Outcome of the segment test
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CornerType {
    Bright,
    Dark,
    None,
}
