pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn unit_to_u8(x: f64) -> u8 {
    (x.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `tan` of an angle in degrees.
pub(crate) fn tan_deg(deg: f64) -> f64 {
    (deg * std::f64::consts::PI / 180.0).tan()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
