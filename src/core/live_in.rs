use tracing::debug;

use super::amortization::Amortization;
use super::error::SimulationResult;
use super::stock::StockPortfolio;
use super::tax::{dividend_tax_event, tax_benefit};
use super::types::{
    LiveInSimulation, MONTHS_PER_YEAR, MonthlyRecord, SimulationParameters, StrategySummary,
};

/// Buy and live in the property, against renting and investing the difference.
///
/// The owner's tax benefit is credited every month rather than at year end. The renter
/// starts with the owner's day-one cash and each month invests the owner's true cost minus
/// rent, so both households spend the same amount every month. When rent exceeds the
/// owner's cost the renter withdraws the gap from the portfolio.
pub fn simulate_live_in_strategy(params: &SimulationParameters) -> SimulationResult<LiveInSimulation> {
    params.validate()?;
    debug!(
        horizon_months = params.horizon_months,
        purchase_price = params.purchase_price,
        "simulating live-in strategy"
    );

    let homeownership = simulate_homeownership(params)?;
    let rent_and_invest = simulate_rent_and_invest(params, &homeownership);

    let homeownership_summary = StrategySummary::from_records(
        params.initial_payment(),
        params.selling_cost_rate,
        &homeownership,
    );
    let rent_and_invest_summary =
        StrategySummary::from_records(params.initial_payment(), 0.0, &rent_and_invest);

    Ok(LiveInSimulation {
        homeownership,
        rent_and_invest,
        homeownership_summary,
        rent_and_invest_summary,
    })
}

fn simulate_homeownership(params: &SimulationParameters) -> SimulationResult<Vec<MonthlyRecord>> {
    let mut loan = Amortization::new(
        params.loan_principal(),
        params.mortgage_rate,
        params.mortgage_term_months,
    )?;
    let closing_costs = params.closing_costs();

    let mut records = Vec::with_capacity(params.horizon_months as usize);
    let mut cumulative_cost = 0.0;
    let mut cumulative_benefit = 0.0;

    for month in 1..=params.horizon_months {
        let opening_value = params.property_value_at(month - 1);
        let property_value = params.property_value_at(month);

        let loan_step = loan.advance();
        let mortgage_payment = loan_step.payment();
        let property_tax = opening_value * params.property_tax_rate / 12.0;
        let maintenance = opening_value * params.maintenance_rate / 12.0;

        let carrying_costs =
            property_tax + params.insurance_monthly + params.hoa_monthly + maintenance;
        let benefit = tax_benefit(loan_step.interest + property_tax, params.tax_bracket);
        let true_cost = mortgage_payment + carrying_costs - benefit;

        cumulative_cost += true_cost;
        cumulative_benefit += benefit;

        let selling_costs = property_value * params.selling_cost_rate;
        let net_proceeds = property_value - loan_step.balance - selling_costs - closing_costs;

        records.push(MonthlyRecord {
            month,
            property_value,
            mortgage_payment,
            interest: loan_step.interest,
            principal: loan_step.principal,
            remaining_balance: loan_step.balance,
            property_tax,
            insurance: params.insurance_monthly,
            hoa: params.hoa_monthly,
            maintenance,
            unrecoverable_cost: loan_step.interest + carrying_costs,
            tax_benefit: benefit,
            true_cost,
            cumulative_cost,
            cumulative_operating_income: cumulative_benefit,
            net_proceeds,
            ..MonthlyRecord::default()
        });
    }

    Ok(records)
}

fn simulate_rent_and_invest(
    params: &SimulationParameters,
    homeownership: &[MonthlyRecord],
) -> Vec<MonthlyRecord> {
    let mut portfolio = StockPortfolio::new(params.initial_payment(), params);
    let mut records = Vec::with_capacity(homeownership.len());
    let mut cumulative_cost = 0.0;

    for owner in homeownership {
        let month = owner.month;
        let rent = params.rent_at(month);
        let contribution = owner.true_cost - rent;
        let dividend = portfolio.advance(contribution);

        let tax_event = (month % MONTHS_PER_YEAR == 0).then(|| {
            let settlement = portfolio.settle_year();
            dividend_tax_event(month / MONTHS_PER_YEAR, settlement.dividends, settlement.tax_paid)
        });
        let dividend_tax = tax_event.map_or(0.0, |event| event.dividend_tax);
        let true_cost = rent + dividend_tax;
        cumulative_cost += true_cost;

        records.push(MonthlyRecord {
            month,
            rent_paid: rent,
            true_cost,
            contribution,
            stock_balance: portfolio.balance(),
            dividend,
            dividend_tax,
            cumulative_cost,
            cumulative_operating_income: portfolio.cumulative_dividends(),
            net_proceeds: portfolio.balance(),
            tax_event,
            ..MonthlyRecord::default()
        });
    }

    records
}
