use serde::{Deserialize, Serialize};

/// Resolution of the atom-centered quadrature grids. Fixed for a whole
/// calculation, the same values are handed to the grid provider for every atom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub radial_precision: f64,
    pub min_angular_points: usize,
    pub max_angular_points: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            radial_precision: 1.0e-12,
            min_angular_points: 86,
            max_angular_points: 302,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GridConfig;

    #[test]
    fn missing_fields_use_defaults() {
        let config: GridConfig = serde_json::from_str(r#"{ "max_angular_points": 590 }"#).unwrap();
        assert_eq!(
            config,
            GridConfig {
                max_angular_points: 590,
                ..GridConfig::default()
            }
        );
    }
}
