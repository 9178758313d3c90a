/// An affine map from raw workspace coordinates into the unit square.
///
/// Basis functions are defined over `[0, 1]²`, while agents move in whatever
/// coordinates their dynamics use. This map fixes the correspondence:
///
/// ```text
///   e = (x + offset) · scale
/// ```
///
/// applied per dimension. The default maps a `[-50, 50]²` workspace onto the
/// unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationMap {
    pub offset: f64,
    pub scale: f64,
}

impl ExplorationMap {
    /// The identity map, for workspaces already expressed in unit coordinates.
    pub fn identity() -> Self {
        Self {
            offset: 0.0,
            scale: 1.0,
        }
    }

    /// Maps a raw position into exploration-space coordinates.
    pub fn to_unit(&self, x: [f64; 2]) -> [f64; 2] {
        [
            (x[0] + self.offset) * self.scale,
            (x[1] + self.offset) * self.scale,
        ]
    }

    /// The (constant, per-dimension) derivative of the map.
    pub fn jacobian(&self) -> f64 {
        self.scale
    }
}

impl Default for ExplorationMap {
    fn default() -> Self {
        Self {
            offset: 50.0,
            scale: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_maps_workspace_corners_to_unit_corners() {
        let map = ExplorationMap::default();
        let low = map.to_unit([-50.0, -50.0]);
        let high = map.to_unit([50.0, 50.0]);
        assert_relative_eq!(low[0], 0.0);
        assert_relative_eq!(low[1], 0.0);
        assert_relative_eq!(high[0], 1.0);
        assert_relative_eq!(high[1], 1.0);
    }

    #[test]
    fn identity_leaves_points_unchanged() {
        let map = ExplorationMap::identity();
        let e = map.to_unit([0.25, 0.75]);
        assert_relative_eq!(e[0], 0.25);
        assert_relative_eq!(e[1], 0.75);
        assert_relative_eq!(map.jacobian(), 1.0);
    }
}
