//! Scalar packing for scene records
//!
//! Converts host-side float parameters into the quantized or derived values
//! stored in `cam0` and `lmp0` records.

/// Convert f32 to unsigned normalized 8-bit integer (unorm8)
///
/// Maps [0.0, 1.0] to [0, 255] rounding to nearest, with exact halves
/// rounding down (0.5 -> 127). Out-of-range input is clamped.
#[inline]
pub fn quantize_unorm8(value: f32) -> u8 {
    let clamped = value.clamp(0.0, 1.0);
    (clamped * 255.0 - 0.5).ceil() as u8
}

/// Pack a linear RGB color as unorm8x3
#[inline]
pub fn pack_color_rgb_unorm8(color: [f32; 3]) -> [u8; 3] {
    [
        quantize_unorm8(color[0]),
        quantize_unorm8(color[1]),
        quantize_unorm8(color[2]),
    ]
}

/// Vertical field of view in degrees from sensor height and focal length
/// (both in millimetres)
#[inline]
pub fn vertical_fov_degrees(lens: f32, sensor_height: f32) -> f32 {
    (2.0 * (0.5 * sensor_height).atan2(lens)).to_degrees()
}
