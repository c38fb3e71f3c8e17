use tracing::debug;

use super::amortization::Amortization;
use super::error::SimulationResult;
use super::stock::StockPortfolio;
use super::tax::{LandlordYear, dividend_tax_event};
use super::types::{
    MONTHS_PER_YEAR, MonthlyRecord, RentalSimulation, SimulationParameters, StrategySummary,
};

/// Buy, rent the property out, and invest each year's tax surplus.
///
/// The paired stock-only series invests the same cash instead: the down payment and
/// closing costs on day one, then every month the landlord's true cost plus principal.
pub fn simulate_rental_strategy(params: &SimulationParameters) -> SimulationResult<RentalSimulation> {
    params.validate()?;
    debug!(
        horizon_months = params.horizon_months,
        purchase_price = params.purchase_price,
        "simulating rental strategy"
    );

    let rental = simulate_rental_property(params)?;
    let stock_only = simulate_stock_only(params, &rental);

    let rental_summary =
        StrategySummary::from_records(params.initial_payment(), params.selling_cost_rate, &rental);
    let stock_only_summary =
        StrategySummary::from_records(params.initial_payment(), 0.0, &stock_only);

    Ok(RentalSimulation {
        rental,
        stock_only,
        rental_summary,
        stock_only_summary,
    })
}

fn simulate_rental_property(params: &SimulationParameters) -> SimulationResult<Vec<MonthlyRecord>> {
    let mut loan = Amortization::new(
        params.loan_principal(),
        params.mortgage_rate,
        params.mortgage_term_months,
    )?;
    let mut side_portfolio = StockPortfolio::new(0.0, params);
    let mut year = LandlordYear::default();
    let closing_costs = params.closing_costs();

    let mut records = Vec::with_capacity(params.horizon_months as usize);
    let mut cumulative_cost = 0.0;
    let mut cumulative_income = 0.0;

    for month in 1..=params.horizon_months {
        let opening_value = params.property_value_at(month - 1);
        let property_value = params.property_value_at(month);

        let loan_step = loan.advance();
        let property_tax = opening_value * params.property_tax_rate / 12.0;
        let maintenance = opening_value * params.maintenance_rate / 12.0;
        let rental_income = params.rent_at(month) * (1.0 - params.vacancy_rate);

        let unrecoverable_cost = loan_step.interest
            + property_tax
            + params.insurance_monthly
            + params.hoa_monthly
            + maintenance;
        let true_cost = unrecoverable_cost - rental_income;

        let dividend = side_portfolio.advance(0.0);
        year.interest += loan_step.interest;
        year.property_tax += property_tax;
        year.rental_income += rental_income;

        let mut contribution = 0.0;
        let mut dividend_tax = 0.0;
        let tax_event = if month % MONTHS_PER_YEAR == 0 {
            let dividends = side_portfolio.close_year_untaxed();
            let event = std::mem::take(&mut year).settle(
                month / MONTHS_PER_YEAR,
                dividends,
                params.tax_bracket,
            );
            // Deficits are not clawed back from the portfolio.
            if event.surplus > 0.0 {
                side_portfolio.contribute(event.surplus);
                contribution = event.surplus;
            }
            dividend_tax = event.dividend_tax;
            debug!(
                year = event.year,
                tax_benefit = event.tax_benefit,
                tax_owed = event.tax_owed,
                surplus = event.surplus,
                "rental annual tax event"
            );
            Some(event)
        } else {
            None
        };

        cumulative_cost += true_cost;
        cumulative_income += rental_income + dividend;

        let selling_costs = property_value * params.selling_cost_rate;
        let net_proceeds = property_value - selling_costs - loan_step.balance - closing_costs
            + side_portfolio.balance();

        records.push(MonthlyRecord {
            month,
            property_value,
            mortgage_payment: loan_step.payment(),
            interest: loan_step.interest,
            principal: loan_step.principal,
            remaining_balance: loan_step.balance,
            property_tax,
            insurance: params.insurance_monthly,
            hoa: params.hoa_monthly,
            maintenance,
            unrecoverable_cost,
            rental_income,
            rent_paid: 0.0,
            tax_benefit: tax_event.map_or(0.0, |event| event.tax_benefit),
            true_cost,
            contribution,
            stock_balance: side_portfolio.balance(),
            dividend,
            dividend_tax,
            cumulative_cost,
            cumulative_operating_income: cumulative_income,
            net_proceeds,
            tax_event,
        });
    }

    Ok(records)
}

fn simulate_stock_only(params: &SimulationParameters, rental: &[MonthlyRecord]) -> Vec<MonthlyRecord> {
    let mut portfolio = StockPortfolio::new(params.initial_payment(), params);
    let mut records = Vec::with_capacity(rental.len());

    for landlord in rental {
        let month = landlord.month;
        let contribution = landlord.true_cost + landlord.principal;
        let dividend = portfolio.advance(contribution);

        let tax_event = (month % MONTHS_PER_YEAR == 0).then(|| {
            let settlement = portfolio.settle_year();
            dividend_tax_event(month / MONTHS_PER_YEAR, settlement.dividends, settlement.tax_paid)
        });
        let dividend_tax = tax_event.map_or(0.0, |event| event.dividend_tax);

        records.push(MonthlyRecord {
            month,
            true_cost: dividend_tax,
            contribution,
            stock_balance: portfolio.balance(),
            dividend,
            dividend_tax,
            cumulative_cost: portfolio.cumulative_dividend_tax(),
            cumulative_operating_income: portfolio.cumulative_dividends(),
            net_proceeds: portfolio.balance(),
            tax_event,
            ..MonthlyRecord::default()
        });
    }

    records
}
