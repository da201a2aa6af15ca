//! The saved customer calculation record and its fan-out into period calculations.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    device::Device,
    period::ViolationPeriod,
    prelude::*,
    quantity::energy::KilowattHours,
    summary::{PeriodCalculation, PeriodInputs},
};

/// The legacy backend stores the collection columns as JSON text inside the row;
/// a fresh export may embed them as plain JSON instead. Either form is accepted,
/// and a malformed blob decodes to its empty default: partially saved data must
/// load, not fail.
fn lenient_blob<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::String(text) => serde_json::from_str(&text).ok(),
        Value::Null => None,
        other => serde_json::from_value(other).ok(),
    };
    Ok(parsed.unwrap_or_default())
}

const fn default_meter_count() -> u32 {
    1
}

/// Devices and invoiced usage surveyed for one period key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonthlyEntry {
    pub devices: Vec<Device>,
    pub paid_electricity: f64,
}

/// A saved customer calculation, column-compatible with the
/// `customer_calculations` rows of the legacy backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerCalculation {
    #[serde(default)]
    pub customer_id: String,

    #[serde(default)]
    pub customer_name: String,

    /// Number of households behind the surveyed meter.
    #[serde(default = "default_meter_count")]
    pub meter_count: u32,

    /// The shared device inventory, used when a period has no survey of its own.
    #[serde(default, deserialize_with = "lenient_blob")]
    pub devices: Vec<Device>,

    #[serde(default, deserialize_with = "lenient_blob")]
    pub compensation_data: Vec<ViolationPeriod>,

    /// Per-period device surveys, keyed by [`ViolationPeriod::key`].
    #[serde(default, deserialize_with = "lenient_blob")]
    pub monthly_devices: BTreeMap<String, MonthlyEntry>,

    /// Per-period invoiced kWh, keyed by [`ViolationPeriod::key`].
    #[serde(default, deserialize_with = "lenient_blob")]
    pub paid_electricity: BTreeMap<String, f64>,

    #[serde(default)]
    pub created_by: String,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub updated_at: Option<String>,
}

impl CustomerCalculation {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("failed to parse the customer calculation")
    }

    #[instrument(skip_all, fields(path = %path.display()), name = "Reading customer calculation…")]
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read `{}`", path.display()))?;
        Self::from_json_str(&contents)
    }

    fn period_devices(&self, key: &str) -> &[Device] {
        match self.monthly_devices.get(key) {
            Some(entry) if !entry.devices.is_empty() => &entry.devices,
            _ => &self.devices,
        }
    }

    fn period_paid(&self, key: &str) -> KilowattHours {
        self.paid_electricity
            .get(key)
            .copied()
            .or_else(|| self.monthly_devices.get(key).map(|entry| entry.paid_electricity))
            .map_or(KilowattHours::ZERO, KilowattHours::from)
            .sanitized()
    }

    /// Recompute every saved period. Periods with no devices contribute zero.
    pub fn period_calculations(&self) -> Vec<PeriodCalculation> {
        self.compensation_data
            .iter()
            .map(|period| {
                let key = period.key();
                PeriodInputs::builder()
                    .period(period)
                    .devices(self.period_devices(&key))
                    .paid_electricity(self.period_paid(&key))
                    .meter_count(self.meter_count.max(1))
                    .build()
                    .calculate()
            })
            .collect()
    }
}
