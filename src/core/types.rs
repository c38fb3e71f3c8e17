use serde::{Deserialize, Serialize};

use super::error::{SimulationError, SimulationResult};

pub const MONTHS_PER_YEAR: u32 = 12;

/// Upper bound on horizons and mortgage terms: 100 years of monthly records.
pub const MAX_MONTHS: u32 = 1_200;

/// Inputs shared by every strategy simulator.
///
/// Rates are annual fractions (`0.065` for 6.5%), money amounts are in dollars.
/// Nothing here is clamped: [`SimulationParameters::validate`] rejects out-of-range
/// values before a simulation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationParameters {
    pub purchase_price: f64,
    pub down_payment_rate: f64,
    pub closing_cost_rate: f64,
    pub selling_cost_rate: f64,
    pub mortgage_rate: f64,
    pub mortgage_term_months: u32,
    pub property_tax_rate: f64,
    pub insurance_monthly: f64,
    pub hoa_monthly: f64,
    pub maintenance_rate: f64,
    pub monthly_rent: f64,
    pub vacancy_rate: f64,
    pub rent_growth_rate: f64,
    pub appreciation_rate: f64,
    pub stock_return_rate: f64,
    pub dividend_yield: f64,
    pub tax_bracket: f64,
    pub horizon_months: u32,
}

impl SimulationParameters {
    pub fn validate(&self) -> SimulationResult<()> {
        for (field, amount) in [
            ("purchasePrice", self.purchase_price),
            ("insuranceMonthly", self.insurance_monthly),
            ("hoaMonthly", self.hoa_monthly),
            ("monthlyRent", self.monthly_rent),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(SimulationError::invalid(
                    field,
                    format!("must be a finite amount >= 0, got {amount}"),
                ));
            }
        }

        for (field, rate) in [
            ("downPaymentRate", self.down_payment_rate),
            ("closingCostRate", self.closing_cost_rate),
            ("sellingCostRate", self.selling_cost_rate),
            ("mortgageRate", self.mortgage_rate),
            ("propertyTaxRate", self.property_tax_rate),
            ("maintenanceRate", self.maintenance_rate),
            ("vacancyRate", self.vacancy_rate),
            ("rentGrowthRate", self.rent_growth_rate),
            ("appreciationRate", self.appreciation_rate),
            ("stockReturnRate", self.stock_return_rate),
            ("dividendYield", self.dividend_yield),
            ("taxBracket", self.tax_bracket),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(SimulationError::invalid(
                    field,
                    format!("must be a fraction between 0 and 1, got {rate}"),
                ));
            }
        }

        for (field, months) in [
            ("mortgageTermMonths", self.mortgage_term_months),
            ("horizonMonths", self.horizon_months),
        ] {
            if !(1..=MAX_MONTHS).contains(&months) {
                return Err(SimulationError::invalid(
                    field,
                    format!("must be between 1 and {MAX_MONTHS} months, got {months}"),
                ));
            }
        }

        Ok(())
    }

    pub fn down_payment(&self) -> f64 {
        self.purchase_price * self.down_payment_rate
    }

    pub fn closing_costs(&self) -> f64 {
        self.purchase_price * self.closing_cost_rate
    }

    pub fn loan_principal(&self) -> f64 {
        self.purchase_price * (1.0 - self.down_payment_rate)
    }

    /// Cash paid on the day of purchase: down payment plus closing costs.
    pub fn initial_payment(&self) -> f64 {
        self.down_payment() + self.closing_costs()
    }

    /// Property value after `month` months of monthly compounding at `appreciation_rate / 12`.
    pub fn property_value_at(&self, month: u32) -> f64 {
        self.purchase_price * (1.0 + self.appreciation_rate / 12.0).powi(month as i32)
    }

    /// Rent for a 1-based month; steps up once per completed year.
    pub fn rent_at(&self, month: u32) -> f64 {
        let completed_years = month.saturating_sub(1) / MONTHS_PER_YEAR;
        self.monthly_rent * (1.0 + self.rent_growth_rate).powi(completed_years as i32)
    }

    pub fn monthly_stock_return(&self) -> f64 {
        self.stock_return_rate / 12.0
    }

    pub fn monthly_dividend_yield(&self) -> f64 {
        self.dividend_yield / 12.0
    }
}

/// Tax settlement computed on every 12th month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualTaxEvent {
    pub year: u32,
    pub annual_interest: f64,
    pub annual_property_tax: f64,
    pub annual_rental_income: f64,
    pub annual_dividends: f64,
    pub tax_benefit: f64,
    pub rental_income_tax: f64,
    pub dividend_tax: f64,
    pub tax_owed: f64,
    /// Benefit minus taxes owed; negative values are deficits.
    pub surplus: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRecord {
    pub month: u32,
    /// Value at the end of the month, used for net proceeds.
    pub property_value: f64,
    pub mortgage_payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub remaining_balance: f64,
    pub property_tax: f64,
    pub insurance: f64,
    pub hoa: f64,
    pub maintenance: f64,
    pub unrecoverable_cost: f64,
    pub rental_income: f64,
    pub rent_paid: f64,
    pub tax_benefit: f64,
    pub true_cost: f64,
    pub contribution: f64,
    pub stock_balance: f64,
    pub dividend: f64,
    pub dividend_tax: f64,
    pub cumulative_cost: f64,
    pub cumulative_operating_income: f64,
    pub net_proceeds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_event: Option<AnnualTaxEvent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub initial_payment: f64,
    pub final_property_value: f64,
    pub final_selling_costs: f64,
    pub final_net_proceeds: f64,
    pub final_stock_balance: f64,
    pub total_cost: f64,
    pub total_operating_income: f64,
    pub total_contributions: f64,
    pub total_dividends: f64,
    pub total_dividend_tax: f64,
    pub total_principal_paid: f64,
}

impl StrategySummary {
    pub fn from_records(
        initial_payment: f64,
        selling_cost_rate: f64,
        records: &[MonthlyRecord],
    ) -> Self {
        let Some(last) = records.last() else {
            return Self {
                initial_payment,
                ..Self::default()
            };
        };

        Self {
            initial_payment,
            final_property_value: last.property_value,
            final_selling_costs: last.property_value * selling_cost_rate,
            final_net_proceeds: last.net_proceeds,
            final_stock_balance: last.stock_balance,
            total_cost: last.cumulative_cost,
            total_operating_income: last.cumulative_operating_income,
            total_contributions: records.iter().map(|r| r.contribution).sum(),
            total_dividends: records.iter().map(|r| r.dividend).sum(),
            total_dividend_tax: records.iter().map(|r| r.dividend_tax).sum(),
            total_principal_paid: records.iter().map(|r| r.principal).sum(),
        }
    }
}

/// Rent-out property paired with the stock-only alternative funded by the same cash.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalSimulation {
    pub rental: Vec<MonthlyRecord>,
    pub stock_only: Vec<MonthlyRecord>,
    pub rental_summary: StrategySummary,
    pub stock_only_summary: StrategySummary,
}

impl RentalSimulation {
    pub fn net_proceeds_advantage(&self) -> f64 {
        self.rental_summary.final_net_proceeds - self.stock_only_summary.final_net_proceeds
    }
}

/// Owner-occupied home paired with renting and investing the difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveInSimulation {
    pub homeownership: Vec<MonthlyRecord>,
    pub rent_and_invest: Vec<MonthlyRecord>,
    pub homeownership_summary: StrategySummary,
    pub rent_and_invest_summary: StrategySummary,
}

impl LiveInSimulation {
    pub fn net_proceeds_advantage(&self) -> f64 {
        self.homeownership_summary.final_net_proceeds
            - self.rent_and_invest_summary.final_net_proceeds
    }
}

/// Year-end points for charting, plus the final month when the horizon is not a whole
/// number of years.
pub fn year_end_records(records: &[MonthlyRecord]) -> Vec<MonthlyRecord> {
    let last_month = records.last().map(|r| r.month);
    records
        .iter()
        .filter(|r| r.month % MONTHS_PER_YEAR == 0 || Some(r.month) == last_month)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::scenario_params;

    #[test]
    fn validate_accepts_dashboard_defaults() {
        assert!(scenario_params().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_horizon() {
        let mut params = scenario_params();
        params.horizon_months = 0;
        let err = params.validate().expect_err("zero horizon must be rejected");
        assert_eq!(err.field(), "horizonMonths");
    }

    #[test]
    fn validate_rejects_months_above_cap() {
        let mut params = scenario_params();
        params.horizon_months = 4_000_000_000;
        let err = params.validate().expect_err("oversized horizon must be rejected");
        assert_eq!(err.field(), "horizonMonths");

        let mut params = scenario_params();
        params.mortgage_term_months = u32::MAX;
        let err = params.validate().expect_err("oversized term must be rejected");
        assert_eq!(err.field(), "mortgageTermMonths");

        let mut params = scenario_params();
        params.horizon_months = MAX_MONTHS;
        params.mortgage_term_months = MAX_MONTHS;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn validate_rejects_rate_outside_unit_interval() {
        let mut params = scenario_params();
        params.vacancy_rate = 1.2;
        let err = params.validate().expect_err("vacancy above 100% must be rejected");
        assert_eq!(err.field(), "vacancyRate");

        let mut params = scenario_params();
        params.mortgage_rate = -0.01;
        let err = params.validate().expect_err("negative rate must be rejected");
        assert_eq!(err.field(), "mortgageRate");
    }

    #[test]
    fn validate_rejects_nan_amounts() {
        let mut params = scenario_params();
        params.hoa_monthly = f64::NAN;
        let err = params.validate().expect_err("NaN must be rejected");
        assert_eq!(err.field(), "hoaMonthly");
    }

    #[test]
    fn rent_steps_up_on_year_boundaries_only() {
        let params = scenario_params();
        assert_eq!(params.rent_at(1), 2_500.0);
        assert_eq!(params.rent_at(12), 2_500.0);
        assert!((params.rent_at(13) - 2_575.0).abs() < 1e-9);
        assert!((params.rent_at(25) - 2_500.0 * 1.03 * 1.03).abs() < 1e-9);
    }

    #[test]
    fn year_end_records_keeps_partial_final_year() {
        let records = (1..=30)
            .map(|month| MonthlyRecord {
                month,
                ..MonthlyRecord::default()
            })
            .collect::<Vec<_>>();
        let months = year_end_records(&records)
            .iter()
            .map(|r| r.month)
            .collect::<Vec<_>>();
        assert_eq!(months, vec![12, 24, 30]);
    }
}
