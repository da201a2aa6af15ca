//! The surveyed device inventory and its energy model.

use serde::{Deserialize, Serialize};

use crate::quantity::{Quantity, energy::KilowattHours, power::Kilowatts, time::Hours};

/// A surveyed electrical device. Field names follow the persisted records, so a
/// device list saved by the legacy tool deserializes as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Device {
    pub name: String,

    /// Counting unit label, e.g. «cái» or «bộ».
    pub unit: String,

    pub quantity: f64,

    /// Rated power.
    pub power: Kilowatts,

    /// Power factor, expected in `0.0..=1.0`. The survey form enforces the range,
    /// this layer only guards against NaN and negatives.
    pub cos_phi: f64,

    pub hours_per_day: Hours,

    /// Days the device was in use within the billing period.
    pub days_per_period: f64,
}

/// A multiplication factor from an untrusted record: non-finite and negative
/// values count as zero.
fn factor(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

impl Device {
    /// Energy the device consumed over the period:
    /// quantity × power × cos φ × hours per day × days × meter count.
    pub fn power_usage(&self, meter_count: u32) -> KilowattHours {
        let hours_per_day = self.hours_per_day.sanitized().min(Hours::FULL_DAY);
        self.power.sanitized() * hours_per_day
            * factor(self.quantity)
            * factor(self.cos_phi)
            * factor(self.days_per_period)
            * f64::from(meter_count)
    }
}

/// Total usage of a device list. Feeds the distribution as `total_usage`.
pub fn total_power_usage(devices: &[Device], meter_count: u32) -> KilowattHours {
    devices.iter().map(|device| device.power_usage(meter_count)).sum()
}
