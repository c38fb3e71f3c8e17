use rentvest::core::{
    PricePoint, PriceSeries, Reading, ReturnWindow, SimulationParameters, compute_indicators,
    simulate_live_in_strategy, simulate_rental_strategy, tax_benefit, year_end_records,
};

fn dashboard_params() -> SimulationParameters {
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

#[test]
fn rental_and_live_in_cover_the_full_horizon() {
    let params = dashboard_params();
    let rental = simulate_rental_strategy(&params).expect("valid params");
    let live_in = simulate_live_in_strategy(&params).expect("valid params");

    assert_eq!(rental.rental.len(), 360);
    assert_eq!(rental.stock_only.len(), 360);
    assert_eq!(live_in.homeownership.len(), 360);
    assert_eq!(live_in.rent_and_invest.len(), 360);

    for (i, record) in rental.rental.iter().enumerate() {
        assert_eq!(record.month, i as u32 + 1);
        assert_eq!(record.tax_event.is_some(), record.month % 12 == 0);
    }
    assert_eq!(rental.rental.last().map(|r| r.remaining_balance), Some(0.0));
}

#[test]
fn both_strategies_start_from_the_same_cash() {
    let params = dashboard_params();
    let rental = simulate_rental_strategy(&params).expect("valid params");
    let live_in = simulate_live_in_strategy(&params).expect("valid params");

    for initial in [
        rental.rental_summary.initial_payment,
        rental.stock_only_summary.initial_payment,
        live_in.rent_and_invest_summary.initial_payment,
    ] {
        assert!((initial - 115_000.0).abs() < 1e-6);
    }
    let first = &live_in.rent_and_invest[0];
    assert!(first.stock_balance > 115_000.0);
}

#[test]
fn live_in_benefit_is_deduction_times_bracket() {
    let params = dashboard_params();
    let live_in = simulate_live_in_strategy(&params).expect("valid params");
    for record in live_in.homeownership.iter().take(24) {
        let expected = tax_benefit(record.interest + record.property_tax, params.tax_bracket);
        assert!((record.tax_benefit - expected).abs() < 1e-9);
    }
}

#[test]
fn advantage_is_ownership_minus_alternative() {
    let params = dashboard_params();
    let rental = simulate_rental_strategy(&params).expect("valid params");
    let expected =
        rental.rental_summary.final_net_proceeds - rental.stock_only_summary.final_net_proceeds;
    assert_eq!(rental.net_proceeds_advantage(), expected);

    let live_in = simulate_live_in_strategy(&params).expect("valid params");
    let expected = live_in.homeownership_summary.final_net_proceeds
        - live_in.rent_and_invest_summary.final_net_proceeds;
    assert_eq!(live_in.net_proceeds_advantage(), expected);
}

#[test]
fn invalid_parameters_are_rejected_before_simulating() {
    let mut params = dashboard_params();
    params.tax_bracket = 1.5;
    let err = simulate_rental_strategy(&params).expect_err("bracket above 100%");
    assert_eq!(err.field(), "taxBracket");
    let err = simulate_live_in_strategy(&params).expect_err("bracket above 100%");
    assert!(err.to_string().contains("taxBracket"));
}

#[test]
fn year_end_view_of_a_thirty_year_run() {
    let rental = simulate_rental_strategy(&dashboard_params()).expect("valid params");
    let yearly = year_end_records(&rental.rental);
    assert_eq!(yearly.len(), 30);
    assert!(yearly.iter().all(|r| r.tax_event.is_some()));
}

#[test]
fn simulation_output_serializes_camel_case() {
    let mut params = dashboard_params();
    params.horizon_months = 12;
    let live_in = simulate_live_in_strategy(&params).expect("valid params");
    let json = serde_json::to_value(&live_in).expect("serializable");

    assert!(json["rentAndInvest"][11]["taxEvent"]["dividendTax"].is_number());
    assert!(json["homeownership"][0]["taxEvent"].is_null());
    assert!(json["homeownershipSummary"]["finalNetProceeds"].is_number());
}

#[test]
fn parameters_round_trip_through_json() {
    let json = serde_json::to_string(&dashboard_params()).expect("serializable");
    assert!(json.contains("\"horizonMonths\":360"));
    let parsed: SimulationParameters = serde_json::from_str(&json).expect("parsable");
    assert_eq!(parsed, dashboard_params());
}

#[test]
fn indicators_over_a_year_of_steady_growth() {
    let start = chrono::NaiveDate::from_ymd_opt(2023, 1, 2).expect("valid date");
    let points = (0..260u64)
        .map(|i| PricePoint {
            date: start
                .checked_add_days(chrono::Days::new(i))
                .expect("date in range"),
            close: 100.0 + i as f64,
            volume: 1_000 + i,
        })
        .collect();
    let series = PriceSeries::new(" vt ", points).expect("valid series");
    let snapshot = compute_indicators(&series).expect("valid series");

    assert_eq!(snapshot.ticker, "VT");
    assert_eq!(snapshot.returns.len(), ReturnWindow::ALL.len());
    let one_year = snapshot
        .return_for(ReturnWindow::OneYear)
        .value()
        .expect("enough history");
    assert!((one_year - (359.0 / 107.0 - 1.0)).abs() < 1e-12);
    assert!(matches!(snapshot.volume_momentum, Reading::Value { value } if value > 1.0));
}
