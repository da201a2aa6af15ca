use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, money::Dong, rate::DongPerKilowattHour};

pub type KilowattHours = Quantity<f64, 1, 1, 0>;

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}kWh", self.0)
    }
}

impl Mul<DongPerKilowattHour> for KilowattHours {
    type Output = Dong;

    fn mul(self, rhs: DongPerKilowattHour) -> Self::Output {
        Quantity(self.0 * rhs.0)
    }
}
