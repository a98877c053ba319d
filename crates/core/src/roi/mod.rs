mod fill;
mod lookup;
mod mask;
mod polygon;
mod session;


use std::fmt;

pub use fill::{FloodFillHoles, HoleFiller, NoFill};
pub use lookup::{Hemisphere, HemisphereLayout, LookupTable};
pub use mask::MaskImage;
pub use polygon::rasterize_polygon;
pub use session::{DrawingSession, InputEvent, InputSource, RoiDisplay, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoiError {
    NoHemispheres,
    DuplicateHemisphere(Hemisphere),
    ImageSizeMismatch {
        expected: [usize; 2],
        actual: [usize; 2],
    },
    VertexCountMismatch {
        expected: usize,
        actual: usize,
    },
    LookupOutOfRange {
        hemisphere: Hemisphere,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for RoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoiError::NoHemispheres => write!(f, "no hemisphere lookup tables supplied"),
            RoiError::DuplicateHemisphere(hemi) => {
                write!(f, "hemisphere {hemi:?} supplied more than once")
            }
            RoiError::ImageSizeMismatch { expected, actual } => write!(
                f,
                "image is {}x{} but the lookup expects {}x{}",
                actual[0], actual[1], expected[0], expected[1]
            ),
            RoiError::VertexCountMismatch { expected, actual } => write!(
                f,
                "vertex mask has {actual} entries but the lookup covers {expected} vertices"
            ),
            RoiError::LookupOutOfRange {
                hemisphere,
                index,
                len,
            } => write!(
                f,
                "{hemisphere:?} lookup references index {index} outside 0..{len}"
            ),
        }
    }
}

impl std::error::Error for RoiError {}
