use serde::{Deserialize, Serialize};

/// Configuration for one association pass.
///
/// Built once from operator input and handed to the engine; the engine never
/// consults process state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssociationConfig {
    /// Diameter of the targeting view-map in micrometers
    pub view_map_diameter_um: f64,

    /// How many lines the indices file receives
    pub indices_layout: IndicesLayout,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            view_map_diameter_um: 2.0,
            indices_layout: IndicesLayout::PerAnchor,
        }
    }
}

impl AssociationConfig {
    /// Config for a view-map of the given diameter with the default layout
    #[must_use]
    pub fn with_diameter(view_map_diameter_um: f64) -> Self {
        Self {
            view_map_diameter_um,
            ..Default::default()
        }
    }

    /// Matching radius: half the view-map diameter
    #[must_use]
    pub fn radius_um(&self) -> f64 {
        self.view_map_diameter_um / 2.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.view_map_diameter_um.is_finite() {
            return Err(format!(
                "view-map diameter must be a finite number, got {}",
                self.view_map_diameter_um
            ));
        }
        if self.view_map_diameter_um <= 0.0 {
            return Err(format!(
                "view-map diameter must be > 0 micrometers, got {}",
                self.view_map_diameter_um
            ));
        }
        Ok(())
    }
}

/// Line layout of the indices file.
///
/// The guide file always gets one line per navigator record, whatever the
/// layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndicesLayout {
    /// One line per anchor, in record order.
    /// This is what the acquisition script reads.
    #[default]
    PerAnchor,

    /// One line per navigator record; empty for records that are not anchors
    PerRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        assert!(AssociationConfig::default().validate().is_ok());
    }

    #[test]
    fn radius_is_half_the_diameter() {
        assert_eq!(AssociationConfig::with_diameter(1.2).radius_um(), 0.6);
    }

    #[test]
    fn rejects_non_positive_or_non_finite_diameter() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = AssociationConfig::with_diameter(bad);
            assert!(config.validate().is_err(), "accepted {bad}");
        }
    }
}
