//! Drawable size and the projection derived from it.
//!
//! The projection keeps the model's aspect ratio on any surface shape:
//! wide surfaces squeeze x, tall surfaces squeeze y.

use bytemuck::{Pod, Zeroable};

/// Pixel dimensions of the current output surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DrawableSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl DrawableSize {
    /// Creates a drawable size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if either dimension is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns width / height, or `None` for an empty surface.
    #[must_use]
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

/// Column-major 4x4 projection matrix, laid out for direct uniform upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Projection {
    /// Matrix columns.
    pub columns: [[f32; 4]; 4],
}

impl Projection {
    /// The identity projection.
    pub const IDENTITY: Self = Self {
        columns: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Computes the projection for a drawable.
    ///
    /// Identity for an empty drawable; otherwise x is scaled by
    /// `1 / aspect` when the surface is wider than tall, else y is scaled by
    /// `aspect`.
    #[must_use]
    pub fn for_drawable(size: DrawableSize) -> Self {
        let mut projection = Self::IDENTITY;
        if let Some(aspect) = size.aspect() {
            if aspect > 1.0 {
                projection.columns[0][0] = 1.0 / aspect;
            } else {
                projection.columns[1][1] = aspect;
            }
        }
        projection
    }

    /// Returns the (x, y) scale factors.
    #[must_use]
    pub fn scale(&self) -> (f32, f32) {
        (self.columns[0][0], self.columns[1][1])
    }

    /// Returns the matrix as bytes for GPU upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::IDENTITY
    }
}
