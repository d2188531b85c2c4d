use std::fmt::{Display, Formatter};

use crate::units::{Energy, Percentage};

/// Storage state of a device: capacity and charge level.
///
/// Immutable; [`DeviceState::apply`] yields the state for a new stored energy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceState {
    pub max_energy: Energy,
    pub percentage: Percentage,
}

impl DeviceState {
    /// Sentinel for devices without storage.
    pub const NO_STORAGE: Self = Self { max_energy: Energy::ZERO, percentage: Percentage::ZERO };

    pub const fn new(max_energy: Energy, percentage: Percentage) -> Self {
        Self { max_energy, percentage }
    }

    pub fn stored_energy(&self) -> Energy {
        self.max_energy * self.percentage
    }

    pub fn has_storage(&self) -> bool {
        self.max_energy.is_positive()
    }

    /// Returns the state holding `stored` energy.
    ///
    /// The level is clamped into `[0, 1]` so that floating-point residue from
    /// efficiency arithmetic never produces an invalid percentage.
    #[must_use]
    pub fn apply(&self, stored: Energy) -> Self {
        if !self.has_storage() {
            return *self;
        }
        Self { max_energy: self.max_energy, percentage: Percentage::saturating(stored / self.max_energy) }
    }
}

impl Display for DeviceState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} ({})", self.stored_energy(), self.max_energy, self.percentage)
    }
}
