//! Pixel format translation
//!
//! Maps the sensor-side pixel vocabulary to transport encoding tags.

use contracts::{encoding, PixelCode};

/// Translate a sensor-side pixel code to its transport encoding tag.
///
/// Total function with no side effects: every supported code maps to exactly
/// one tag, and codes outside the vocabulary degrade to RGB-8 rather than
/// failing, so an unexpected format never blocks publication outright - it
/// only degrades interpretation downstream.
pub fn encoding_for(code: PixelCode) -> &'static str {
    match code {
        PixelCode::Bgr8 => encoding::BGR8,
        PixelCode::Bgra8 => encoding::BGRA8,
        PixelCode::Rgb8 => encoding::RGB8,
        PixelCode::Rgba8 => encoding::RGBA8,
        PixelCode::Mono8 => encoding::MONO8,
        PixelCode::Mono16 => encoding::MONO16,
        PixelCode::MonoFloat => encoding::TYPE_32FC1,
        PixelCode::BayerBggr8 => encoding::BAYER_BGGR8,
        PixelCode::BayerBggr16 => encoding::BAYER_BGGR16,
        PixelCode::BayerGbrg8 => encoding::BAYER_GBRG8,
        PixelCode::BayerGbrg16 => encoding::BAYER_GBRG16,
        PixelCode::BayerGrbg8 => encoding::BAYER_GRBG8,
        PixelCode::BayerGrbg16 => encoding::BAYER_GRBG16,
        PixelCode::BayerRggb8 => encoding::BAYER_RGGB8,
        PixelCode::BayerRggb16 => encoding::BAYER_RGGB16,
        PixelCode::Unknown(_) => encoding::RGB8,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_code_has_one_tag() {
        let cases = [
            (PixelCode::Bgr8, encoding::BGR8),
            (PixelCode::Bgra8, encoding::BGRA8),
            (PixelCode::Rgb8, encoding::RGB8),
            (PixelCode::Rgba8, encoding::RGBA8),
            (PixelCode::Mono8, encoding::MONO8),
            (PixelCode::Mono16, encoding::MONO16),
            (PixelCode::MonoFloat, encoding::TYPE_32FC1),
            (PixelCode::BayerBggr8, encoding::BAYER_BGGR8),
            (PixelCode::BayerBggr16, encoding::BAYER_BGGR16),
            (PixelCode::BayerGbrg8, encoding::BAYER_GBRG8),
            (PixelCode::BayerGbrg16, encoding::BAYER_GBRG16),
            (PixelCode::BayerGrbg8, encoding::BAYER_GRBG8),
            (PixelCode::BayerGrbg16, encoding::BAYER_GRBG16),
            (PixelCode::BayerRggb8, encoding::BAYER_RGGB8),
            (PixelCode::BayerRggb16, encoding::BAYER_RGGB16),
        ];
        for (code, tag) in cases {
            assert_eq!(encoding_for(code), tag, "code {code:?}");
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_rgb8() {
        assert_eq!(encoding_for(PixelCode::Unknown(0)), encoding::RGB8);
        assert_eq!(encoding_for(PixelCode::Unknown(0xdead)), encoding::RGB8);
    }
}
