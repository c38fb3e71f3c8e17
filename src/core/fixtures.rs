use super::types::SimulationParameters;

/// The dashboard's default scenario with an 8.3% vacancy rate.
pub(crate) fn scenario_params() -> SimulationParameters {
    SimulationParameters {
        purchase_price: 500_000.0,
        down_payment_rate: 0.20,
        closing_cost_rate: 0.03,
        selling_cost_rate: 0.06,
        mortgage_rate: 0.065,
        mortgage_term_months: 360,
        property_tax_rate: 0.012,
        insurance_monthly: 150.0,
        hoa_monthly: 200.0,
        maintenance_rate: 0.01,
        monthly_rent: 2_500.0,
        vacancy_rate: 0.083,
        rent_growth_rate: 0.03,
        appreciation_rate: 0.03,
        stock_return_rate: 0.10,
        dividend_yield: 0.02,
        tax_bracket: 0.25,
        horizon_months: 360,
    }
}

/// Everything that grows or is taxed set to zero, so cash flows are easy to follow by hand.
pub(crate) fn flat_params() -> SimulationParameters {
    SimulationParameters {
        purchase_price: 120_000.0,
        down_payment_rate: 0.25,
        closing_cost_rate: 0.0,
        selling_cost_rate: 0.0,
        mortgage_rate: 0.0,
        mortgage_term_months: 12,
        property_tax_rate: 0.0,
        insurance_monthly: 0.0,
        hoa_monthly: 0.0,
        maintenance_rate: 0.0,
        monthly_rent: 1_000.0,
        vacancy_rate: 0.0,
        rent_growth_rate: 0.0,
        appreciation_rate: 0.0,
        stock_return_rate: 0.0,
        dividend_yield: 0.0,
        tax_bracket: 0.0,
        horizon_months: 24,
    }
}
