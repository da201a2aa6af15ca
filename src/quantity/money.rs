use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Vietnamese đồng.
pub type Dong = Quantity<f64, 0, 0, 1>;

impl Dong {
    /// Round to whole đồng for invoicing.
    pub fn rounded(self) -> Self {
        Self(self.0.round())
    }
}

impl Display for Dong {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} ₫", self.0)
    }
}

impl Debug for Dong {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}₫", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded() {
        assert_eq!(Dong::from(1806.4).rounded(), Dong::from(1806.0));
        assert_eq!(Dong::from(1806.5).rounded(), Dong::from(1807.0));
    }
}
