use std::error::Error;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::cap::BoxCap;

/// Onsets (and optionally the center) of a box CAP in a config file, in bohr.
#[derive(Deserialize, Debug, Clone)]
pub struct CapConfig {
    cap_x: f64,
    cap_y: f64,
    cap_z: f64,
    #[serde(default)]
    origin: Option<[f64; 3]>,
}

impl CapConfig {
    pub fn new(cap_x: f64, cap_y: f64, cap_z: f64) -> Self {
        Self {
            cap_x,
            cap_y,
            cap_z,
            origin: None,
        }
    }

    pub fn with_origin(self, origin: [f64; 3]) -> Self {
        Self {
            origin: Some(origin),
            ..self
        }
    }
}

impl TryFrom<CapConfig> for BoxCap {
    type Error = Box<dyn Error>;

    fn try_from(value: CapConfig) -> Result<Self, Self::Error> {
        let CapConfig {
            cap_x,
            cap_y,
            cap_z,
            origin,
        } = value;

        for onset in [cap_x, cap_y, cap_z] {
            if !(onset.is_finite() && onset >= 0.0) {
                return Err(format!("CAP onset must be a non-negative number, got {onset}").into());
            }
        }

        let cap = BoxCap::new(cap_x, cap_y, cap_z);
        Ok(match origin {
            Some([x, y, z]) => cap.with_origin(Vector3::new(x, y, z)),
            None => cap,
        })
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;

    use crate::cap::BoxCap;

    use super::CapConfig;

    #[test]
    fn parse_box_cap() {
        let config: CapConfig = serde_json::from_str(
            r#"{ "cap_x": 2.76, "cap_y": 2.76, "cap_z": 4.88, "origin": [0, 0, 1] }"#,
        )
        .unwrap();
        let cap = BoxCap::try_from(config).unwrap();
        assert_eq!(cap.onsets, Vector3::new(2.76, 2.76, 4.88));
        assert_eq!(cap.origin, Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn negative_onset_is_rejected() {
        assert!(BoxCap::try_from(CapConfig::new(1.0, -1.0, 1.0)).is_err());
    }
}
