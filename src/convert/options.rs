/// Constants used when building and converting maps.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Physical height that a normalized height of 1.0 represents.
    pub height_scale: f32,
    /// Physical water level of a new map.
    pub water_level: f32,
    /// Lower bound of the splat/biome/alpha resolution.
    pub min_splat_res: usize,
    /// Upper bound of the splat/biome/alpha resolution.
    pub max_splat_res: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            height_scale: 1000.0,
            water_level: 500.0,
            min_splat_res: 16,
            max_splat_res: 2048,
        }
    }
}
