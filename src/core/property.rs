use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A leasable space in a property's rent roll.
///
/// Spaces are input data for scenario builders and the portfolio generator;
/// the engine itself never reads them directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    /// Suite or tenant name.
    pub name: String,
    /// Area in square feet.
    pub area: Decimal,
    /// Contract rent in dollars per square foot per year.
    pub annual_rent_psf: Decimal,
    /// Lease commencement.
    pub lease_start: NaiveDate,
    /// Lease term in months.
    pub lease_term_months: u32,
}

/// The asset under analysis.
///
/// Read-only from the engine's perspective: the orchestrator consults
/// `net_rentable_area` for the occupancy pre-pass and nothing else. The rent
/// roll travels with the property so scenario builders can assemble the
/// model set from one input.
///
/// # Examples
///
/// ```
/// use proforma_engine::core::property::Property;
/// use rust_decimal_macros::dec;
///
/// let property = Property::new("100 Main Street", dec!(20_000));
/// assert_eq!(property.net_rentable_area(), dec!(20_000));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    name: String,
    net_rentable_area: Decimal,
    #[serde(default)]
    spaces: Vec<Space>,
}

impl Property {
    pub fn new(name: impl Into<String>, net_rentable_area: Decimal) -> Self {
        Self {
            name: name.into(),
            net_rentable_area,
            spaces: Vec::new(),
        }
    }

    /// Append a space to the rent roll.
    pub fn with_space(mut self, space: Space) -> Self {
        self.spaces.push(space);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Net rentable area in square feet. May legitimately be zero for a
    /// land parcel; the occupancy pre-pass handles that without dividing.
    pub fn net_rentable_area(&self) -> Decimal {
        self.net_rentable_area
    }

    pub fn spaces(&self) -> &[Space] {
        &self.spaces
    }

    /// Total area of all spaces in the rent roll.
    pub fn leased_area(&self) -> Decimal {
        self.spaces.iter().map(|s| s.area).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_property_rent_roll() {
        let property = Property::new("Tower", dec!(20_000))
            .with_space(Space {
                name: "Suite 100".into(),
                area: dec!(10_000),
                annual_rent_psf: dec!(30),
                lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                lease_term_months: 60,
            })
            .with_space(Space {
                name: "Suite 200".into(),
                area: dec!(8_000),
                annual_rent_psf: dec!(28),
                lease_start: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                lease_term_months: 36,
            });

        assert_eq!(property.spaces().len(), 2);
        assert_eq!(property.leased_area(), dec!(18_000));
    }
}
