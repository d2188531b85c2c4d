//! Forced car-charging window, the manipulator the optimizer searches over.

use std::fmt::{self, Display, Formatter};

use chrono::TimeDelta;

use crate::devices::{DeviceMap, DeviceType};
use crate::sim::DeviceManipulator;
use crate::units::{Percentage, Timestamp};

/// Forces electric cars to charge to 100% for `hours` hours from `start`.
///
/// Outside the window the cars fall back to their configured limit. The
/// window never leaves the horizon `[from, to]` it was created for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CarCharge {
    pub hours: u32,
    pub from: Timestamp,
    pub to: Timestamp,
    pub start: Timestamp,
    /// Restricts the window to the car with this id; all cars if unset.
    pub car: Option<String>,
}

impl CarCharge {
    /// A window of `hours` hours starting at the beginning of the horizon.
    pub fn init(from: Timestamp, to: Timestamp, hours: u32) -> Self {
        Self { hours, from, to, start: from, car: None }
    }

    #[must_use]
    pub fn for_car(mut self, car: impl Into<String>) -> Self {
        self.car = Some(car.into());
        self
    }

    /// End of the window (exclusive).
    pub fn end(&self) -> Timestamp {
        self.start + TimeDelta::hours(i64::from(self.hours))
    }

    /// Whether `time` falls into `[start, end)`.
    pub fn is_active(&self, time: Timestamp) -> bool {
        self.start <= time && time < self.end()
    }

    /// Whether the window lies completely inside the horizon.
    pub fn is_within_horizon(&self) -> bool {
        self.hours > 0 && self.from <= self.start && self.end() <= self.to
    }
}

impl DeviceManipulator for CarCharge {
    fn apply(&self, time: Timestamp, devices: &mut DeviceMap) {
        let active = self.is_active(time);
        for (device_ref, device) in devices.iter_mut() {
            if device_ref.device_type != DeviceType::ElectricCar {
                continue;
            }
            if self.car.as_ref().is_some_and(|car| *car != device_ref.id) {
                continue;
            }
            let Some(car) = device.as_car_mut() else {
                continue;
            };
            if active {
                car.set_override_force_charging_limit(Percentage::ONE_HUNDRED);
            } else {
                car.reset_override_force_charging_limit();
            }
        }
    }

    /// Shifts the window by one hour either way and grows or shrinks it by
    /// one hour, dropping neighbors that would leave the horizon.
    fn evolute(&self) -> Vec<Self> {
        let hour = TimeDelta::hours(1);
        let mut neighbors = vec![
            Self { start: self.start + hour, ..self.clone() },
            Self { start: self.start - hour, ..self.clone() },
            Self { hours: self.hours + 1, ..self.clone() },
        ];
        if self.hours > 1 {
            neighbors.push(Self { hours: self.hours - 1, ..self.clone() });
        }
        neighbors.retain(Self::is_within_horizon);
        neighbors
    }
}

impl Display for CarCharge {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let car = self.car.as_deref().unwrap_or("all cars");
        write!(f, "charge {car} from {} for {}h", self.start.format("%a %H:%M"), self.hours)
    }
}
