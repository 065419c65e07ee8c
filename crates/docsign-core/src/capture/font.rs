//! Embedded font lookup for typed signatures
//!
//! Faces come from the font set bundled with `typst-assets`, indexed once per
//! process and reused for every render.

use ab_glyph::FontRef;
use std::sync::OnceLock;
use typst::foundations::Bytes;
use typst::text::{Font, FontStyle};

use crate::error::{DocsignError, Result};

struct EmbeddedFace {
    family: String,
    italic: bool,
    data: &'static [u8],
    index: u32,
}

static FACES: OnceLock<Vec<EmbeddedFace>> = OnceLock::new();

fn embedded_faces() -> &'static [EmbeddedFace] {
    FACES.get_or_init(|| {
        let mut faces = Vec::new();
        for data in typst_assets::fonts() {
            for font in Font::iter(Bytes::from_static(data)) {
                let info = font.info();
                faces.push(EmbeddedFace {
                    family: info.family.clone(),
                    italic: info.variant.style != FontStyle::Normal,
                    data,
                    index: font.index(),
                });
            }
        }
        tracing::debug!("Indexed {} embedded font faces", faces.len());
        faces
    })
}

/// Face used for typed signatures.
///
/// Prefers an italic face of `preferred_family`, then any italic face, then
/// any embedded face at all.
pub fn signature_font(preferred_family: &str) -> Result<FontRef<'static>> {
    let faces = embedded_faces();
    let face = faces
        .iter()
        .find(|f| f.italic && f.family.eq_ignore_ascii_case(preferred_family))
        .or_else(|| faces.iter().find(|f| f.italic))
        .or_else(|| faces.first())
        .ok_or(DocsignError::FontUnavailable)?;

    FontRef::try_from_slice_and_index(face.data, face.index)
        .map_err(|_| DocsignError::FontUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ab_glyph::Font as _;

    #[test]
    fn test_embedded_faces_available() {
        assert!(!embedded_faces().is_empty());
        assert!(embedded_faces().iter().any(|f| f.italic));
    }

    #[test]
    fn test_signature_font_has_latin_glyphs() {
        let font = signature_font("Libertinus Serif").unwrap();
        assert_ne!(font.glyph_id('A').0, 0);
        assert_ne!(font.glyph_id('z').0, 0);
    }

    #[test]
    fn test_unknown_family_falls_back() {
        assert!(signature_font("No Such Family").is_ok());
    }
}
