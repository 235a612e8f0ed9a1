use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::Result;

/// How a vehicle's pose is derived from the path.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxleLayout {
    /// Pose taken from the single path point under the vehicle.
    Simple,
    /// Pose taken from two path points `axle_offset` ahead and behind.
    MultiAxle { axle_offset: f32 },
}

/// Placement of a coupling socket.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketSpec {
    /// Distance from the vehicle origin, outward along the socket's facing.
    pub offset: f32,
    /// Reach of the socket when looking for a partner.
    pub range: f32,
}

/// Static description of a vehicle type.
///
/// ```ignore
/// (mass: 25.0, axles: MultiAxle(axle_offset: 0.6), front: Some((offset: 0.9, range: 0.4)))
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleProfile {
    pub mass: f32,
    pub axles: AxleLayout,
    pub front: Option<SocketSpec>,
    pub back: Option<SocketSpec>,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            mass: 10.0,
            axles: AxleLayout::Simple,
            front: Some(SocketSpec {
                offset: 0.75,
                range: 0.5,
            }),
            back: Some(SocketSpec {
                offset: 0.75,
                range: 0.5,
            }),
        }
    }
}

impl VehicleProfile {
    pub fn from_ron(text: &str) -> Result<Self> {
        let profile: Self = ron::from_str(text)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<()> {
        config::positive("mass", self.mass)?;
        if let AxleLayout::MultiAxle { axle_offset } = self.axles {
            config::positive("axle_offset", axle_offset)?;
        }
        for socket in self.front.iter().chain(self.back.iter()) {
            config::positive("socket.range", socket.range)?;
            if !socket.offset.is_finite() {
                return Err(config::invalid("socket.offset", "must be finite"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RailError;
    use approx::assert_relative_eq;

    #[test]
    fn default_profile_is_valid() {
        assert!(VehicleProfile::default().validate().is_ok());
    }

    #[test]
    fn from_ron_reads_layout_and_sockets() {
        let profile = VehicleProfile::from_ron(
            "(mass: 25.0, axles: MultiAxle(axle_offset: 0.6), front: Some((offset: 0.9, range: 0.4)), back: None)",
        )
        .unwrap();
        assert_relative_eq!(profile.mass, 25.0);
        assert_eq!(profile.axles, AxleLayout::MultiAxle { axle_offset: 0.6 });
        assert_relative_eq!(profile.front.unwrap().offset, 0.9);
        assert!(profile.back.is_none());
    }

    #[test]
    fn rejects_massless_vehicle() {
        let err = VehicleProfile::from_ron("(mass: 0.0)").unwrap_err();
        assert!(matches!(err, RailError::InvalidConfig { field: "mass", .. }));
    }
}
