use std::{fmt, sync::Arc};

/// Identity of a glyph texture/atlas, used to bind draw calls.
///
/// Two glyphs belong to the same texture-run exactly when their textures
/// report the same `TextureId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u64);

/// Handle to the texture/atlas that owns a set of rasterized glyphs.
///
/// The font engine that produced the glyphs owns the actual pixel data; this
/// trait only exposes what the batched renderer needs: an identity for
/// texture binding and the blend state the atlas format requires.
pub trait GlyphTexture {
    fn id(&self) -> TextureId;

    /// Applies the blend/texture state required to draw from this atlas.
    ///
    /// Called once per draw, not per glyph.
    fn apply_blend_state(&self);
}

/// A single shaped glyph, as delivered by the font collaborator.
///
/// All coordinates are relative to the pen origin at the glyph's baseline.
/// Glyphs are consumed read-only; shaping and rasterization have already
/// happened by the time one of these exists.
#[derive(Clone)]
pub struct Glyph {
    /// Horizontal pen advance after placing this glyph.
    pub advance: f32,
    /// Bounding quad offsets relative to the pen origin.
    pub bounds: euclid::default::Box2D<f32>,
    /// Texture coordinates for the quad corners, in the order
    /// bottom-left, bottom-right, top-right, top-left.
    pub tex_coords: [[f32; 2]; 4],
    /// The atlas that owns this glyph's pixels.
    pub texture: Arc<dyn GlyphTexture>,
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("advance", &self.advance)
            .field("bounds", &self.bounds)
            .field("texture", &self.texture.id())
            .finish()
    }
}

/// The font collaborator: shapes text into glyphs and reports line metrics.
///
/// `descent` follows the below-baseline convention (negative for glyphs
/// extending under the baseline), so `ascent - descent` spans a full line.
pub trait GlyphProvider {
    /// Returns one glyph per `char` of `text`, in order.
    fn glyphs(&self, text: &str) -> Vec<Glyph>;

    fn ascent(&self) -> f32;

    fn descent(&self) -> f32;
}
