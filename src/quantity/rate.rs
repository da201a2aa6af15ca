use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Đồng per kilowatt-hour.
pub type DongPerKilowattHour = Quantity<f64, -1, -1, 1>;

impl Display for DongPerKilowattHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} ₫/kWh", self.0)
    }
}

impl Debug for DongPerKilowattHour {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}₫/kWh", self.0)
    }
}
