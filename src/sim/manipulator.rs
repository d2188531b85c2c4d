use std::fmt::Debug;

use crate::devices::DeviceMap;
use crate::units::Timestamp;

/// A time-scoped override of device control parameters.
///
/// The engine applies every manipulator at the start of each slot, before
/// any device runs, so overrides can begin and end in the middle of a run.
/// A manipulator must both install its override inside its window and
/// remove it outside, since it sees the device map left by the previous slot.
pub trait DeviceManipulator: Debug {
    /// Adjusts `devices` for the slot starting at `time`.
    fn apply(&self, time: Timestamp, devices: &mut DeviceMap);

    /// Neighbors of this manipulator for schedule search, each differing
    /// in a single dimension.
    fn evolute(&self) -> Vec<Self>
    where
        Self: Sized;
}
