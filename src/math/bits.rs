//! Quantization between normalized weights, bytes and flags.
//!
//! Every raster transcode goes through these four functions, so a float that
//! survives `float_to_byte` -> `byte_to_float` is off by at most 1/255 and a
//! flag survives `bool_to_byte` -> `byte_to_bool` exactly.

/// `round(clamp(value, 0, 1) * 255)`. NaN maps to 0.
pub fn float_to_byte(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

pub fn byte_to_float(value: u8) -> f32 {
    value as f32 / 255.0
}

pub fn bool_to_byte(value: bool) -> u8 {
    if value {
        255
    } else {
        0
    }
}

/// Any non-zero byte is a set flag.
pub fn byte_to_bool(value: u8) -> bool {
    value > 0
}
