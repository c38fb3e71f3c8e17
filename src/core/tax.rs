use super::types::AnnualTaxEvent;

/// Value of a deduction to the taxpayer: the deducted amount times the marginal bracket.
pub fn tax_benefit(deductible: f64, tax_bracket: f64) -> f64 {
    deductible * tax_bracket
}

pub fn income_tax(income: f64, tax_bracket: f64) -> f64 {
    income * tax_bracket
}

/// Year-to-date totals a landlord files at the 12-month boundary.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LandlordYear {
    pub interest: f64,
    pub property_tax: f64,
    pub rental_income: f64,
}

impl LandlordYear {
    pub fn settle(self, year: u32, dividends: f64, tax_bracket: f64) -> AnnualTaxEvent {
        let benefit = tax_benefit(self.interest + self.property_tax, tax_bracket);
        let rental_income_tax = income_tax(self.rental_income, tax_bracket);
        let dividend_tax = income_tax(dividends, tax_bracket);
        let tax_owed = rental_income_tax + dividend_tax;

        AnnualTaxEvent {
            year,
            annual_interest: self.interest,
            annual_property_tax: self.property_tax,
            annual_rental_income: self.rental_income,
            annual_dividends: dividends,
            tax_benefit: benefit,
            rental_income_tax,
            dividend_tax,
            tax_owed,
            surplus: benefit - tax_owed,
        }
    }
}

/// A stock-only investor's year: dividends are the only taxable item.
pub(crate) fn dividend_tax_event(year: u32, dividends: f64, tax_paid: f64) -> AnnualTaxEvent {
    AnnualTaxEvent {
        year,
        annual_dividends: dividends,
        dividend_tax: tax_paid,
        tax_owed: tax_paid,
        surplus: -tax_paid,
        ..AnnualTaxEvent::default()
    }
}
