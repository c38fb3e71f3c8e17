mod amortization;
mod error;
#[cfg(test)]
mod fixtures;
mod indicators;
mod live_in;
mod rental;
mod stock;
mod tax;
mod types;

pub use amortization::{
    Amortization, AmortizationRow, AmortizationStep, amortization_schedule, monthly_payment,
    total_interest,
};
pub use error::{SimulationError, SimulationResult};
pub use indicators::{
    IndicatorSnapshot, PricePoint, PriceSeries, Reading, ReturnWindow, TickerIndicators,
    WindowReturn, compute_indicators, compute_portfolio_indicators, format_return,
    format_volume_momentum, trailing_return, volume_momentum,
};
pub use live_in::simulate_live_in_strategy;
pub use rental::simulate_rental_strategy;
pub use stock::{DividendSettlement, StockPortfolio, advance_month, apply_annual_dividend_tax};
pub use tax::{income_tax, tax_benefit};
pub use types::{
    AnnualTaxEvent, LiveInSimulation, MAX_MONTHS, MONTHS_PER_YEAR, MonthlyRecord,
    RentalSimulation, SimulationParameters, StrategySummary, year_end_records,
};
