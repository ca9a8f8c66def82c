use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Global underwriting assumptions, immutable for a run.
///
/// Items read growth rates from here during evaluation; scenario builders
/// read the optional assumptions to decide which expense and loss items to
/// assemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSettings {
    /// Annual market rent growth, as a fraction (0.03 = 3%/year).
    pub market_rent_growth_pct: Decimal,
    /// Annual operating expense inflation, as a fraction.
    pub expense_inflation_pct: Decimal,
    /// Base operating expenses in dollars per square foot per year, when the
    /// scenario should assemble a default expense line.
    pub operating_expense_psf: Option<Decimal>,
    /// General vacancy loss as a fraction of potential gross revenue.
    pub general_vacancy_pct: Option<Decimal>,
    /// Collection loss as a fraction of revenue net of vacancy.
    pub collection_loss_pct: Option<Decimal>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            market_rent_growth_pct: Decimal::ZERO,
            expense_inflation_pct: Decimal::ZERO,
            operating_expense_psf: None,
            general_vacancy_pct: None,
            collection_loss_pct: None,
        }
    }
}

impl AnalysisSettings {
    pub fn with_market_rent_growth(mut self, pct: Decimal) -> Self {
        self.market_rent_growth_pct = pct;
        self
    }

    pub fn with_expense_inflation(mut self, pct: Decimal) -> Self {
        self.expense_inflation_pct = pct;
        self
    }

    pub fn with_operating_expense_psf(mut self, psf: Decimal) -> Self {
        self.operating_expense_psf = Some(psf);
        self
    }

    pub fn with_general_vacancy(mut self, pct: Decimal) -> Self {
        self.general_vacancy_pct = Some(pct);
        self
    }

    pub fn with_collection_loss(mut self, pct: Decimal) -> Self {
        self.collection_loss_pct = Some(pct);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_builder_chain() {
        let settings = AnalysisSettings::default()
            .with_market_rent_growth(dec!(0.03))
            .with_general_vacancy(dec!(0.05));
        assert_eq!(settings.market_rent_growth_pct, dec!(0.03));
        assert_eq!(settings.general_vacancy_pct, Some(dec!(0.05)));
        assert_eq!(settings.collection_loss_pct, None);
    }
}
