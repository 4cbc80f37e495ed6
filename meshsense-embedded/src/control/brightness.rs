/// Ambient reading upper bounds and the output level each band asks for.
/// Readings above the last bound turn the output off.
pub const BRIGHTNESS_BANDS: [(u16, u8); 5] = [
    (100, 255),
    (300, 230),
    (800, 200),
    (1500, 150),
    (2500, 100),
];

/// Target output level for an ambient reading. Darker means brighter.
pub fn target_level(sample: u16) -> u8 {
    BRIGHTNESS_BANDS
        .iter()
        .find(|(bound, _)| sample <= *bound)
        .map(|(_, level)| *level)
        .unwrap_or(0)
}

/// Output level as a whole percentage of full scale.
pub fn level_percent(level: f32) -> u8 {
    libm::roundf(level / 255.0 * 100.0).clamp(0.0, 100.0) as u8
}
