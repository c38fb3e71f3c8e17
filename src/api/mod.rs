use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::core::{
    LiveInSimulation, MAX_MONTHS, MONTHS_PER_YEAR, MonthlyRecord, PriceSeries, RentalSimulation,
    ReturnWindow, SimulationParameters, StrategySummary, TickerIndicators,
    compute_portfolio_indicators, format_return, format_volume_momentum,
    simulate_live_in_strategy, simulate_rental_strategy, year_end_records,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliResolution {
    Monthly,
    Yearly,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiResolution {
    #[serde(alias = "month", alias = "Monthly")]
    Monthly,
    #[serde(alias = "year", alias = "Yearly", alias = "annual")]
    Yearly,
}

impl From<ApiResolution> for CliResolution {
    fn from(value: ApiResolution) -> Self {
        match value {
            ApiResolution::Monthly => CliResolution::Monthly,
            ApiResolution::Yearly => CliResolution::Yearly,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    purchase_price: Option<f64>,
    down_payment: Option<f64>,
    closing_costs: Option<f64>,
    selling_costs: Option<f64>,

    mortgage_rate: Option<f64>,
    mortgage_term_years: Option<u32>,

    property_tax_rate: Option<f64>,
    insurance: Option<f64>,
    hoa: Option<f64>,
    maintenance_rate: Option<f64>,

    rent: Option<f64>,
    vacancy_rate: Option<f64>,
    rent_growth: Option<f64>,
    appreciation: Option<f64>,

    stock_return: Option<f64>,
    dividend_yield: Option<f64>,
    tax_bracket: Option<f64>,

    horizon_years: Option<u32>,
    horizon_months: Option<u32>,
    resolution: Option<ApiResolution>,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "rentvest",
    about = "Compare buying a property (rented out or lived in) against investing the same cash in stocks"
)]
struct Cli {
    #[arg(long, default_value_t = 500_000.0)]
    purchase_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Down payment in percent of price")]
    down_payment: f64,
    #[arg(long, default_value_t = 3.0, help = "Closing costs in percent of price")]
    closing_costs: f64,
    #[arg(long, default_value_t = 6.0, help = "Selling costs in percent of sale value")]
    selling_costs: f64,
    #[arg(long, default_value_t = 6.5, help = "Mortgage annual rate in percent")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 30)]
    mortgage_term_years: u32,
    #[arg(long, default_value_t = 1.2, help = "Property tax in percent of value per year")]
    property_tax_rate: f64,
    #[arg(long, default_value_t = 150.0, help = "Insurance per month")]
    insurance: f64,
    #[arg(long, default_value_t = 200.0, help = "HOA dues per month")]
    hoa: f64,
    #[arg(long, default_value_t = 1.0, help = "Maintenance in percent of value per year")]
    maintenance_rate: f64,
    #[arg(long, default_value_t = 2_500.0, help = "Monthly rent, received or paid")]
    rent: f64,
    #[arg(long, default_value_t = 8.3, help = "Vacancy rate in percent")]
    vacancy_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent increase in percent")]
    rent_growth: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual property appreciation in percent")]
    appreciation: f64,
    #[arg(long, default_value_t = 10.0, help = "Expected annual stock return in percent")]
    stock_return: f64,
    #[arg(long, default_value_t = 2.0, help = "Annual dividend yield in percent")]
    dividend_yield: f64,
    #[arg(long, default_value_t = 25.0, help = "Marginal tax bracket in percent")]
    tax_bracket: f64,
    #[arg(long, default_value_t = 30)]
    horizon_years: u32,
    #[arg(long, help = "Horizon in months; overrides --horizon-years")]
    horizon_months: Option<u32>,
    #[arg(long, value_enum, default_value_t = CliResolution::Yearly)]
    resolution: CliResolution,
    #[arg(long, help = "Print the full record series, not just summaries")]
    records: bool,
    #[arg(
        long,
        help = "JSON file of price series ({\"series\": [...]}) to compute indicators for"
    )]
    prices: Option<PathBuf>,
}

#[derive(Debug)]
struct ApiRequest {
    params: SimulationParameters,
    resolution: CliResolution,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RentalResponse {
    rental: Vec<MonthlyRecord>,
    stock_only: Vec<MonthlyRecord>,
    rental_summary: StrategySummary,
    stock_only_summary: StrategySummary,
    net_proceeds_advantage: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveInResponse {
    homeownership: Vec<MonthlyRecord>,
    rent_and_invest: Vec<MonthlyRecord>,
    homeownership_summary: StrategySummary,
    rent_and_invest_summary: StrategySummary,
    net_proceeds_advantage: f64,
}

#[derive(Debug, Default, Deserialize)]
struct IndicatorsPayload {
    #[serde(default)]
    series: Vec<PriceSeries>,
}

#[derive(Debug, Serialize)]
struct IndicatorsResponse {
    indicators: Vec<TickerIndicators>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormattedReturn {
    window: ReturnWindow,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndicatorRow {
    ticker: String,
    as_of: Option<NaiveDate>,
    last_close: Option<f64>,
    returns: Vec<FormattedReturn>,
    volume_momentum: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CliReport {
    parameters: SimulationParameters,
    rental_summary: StrategySummary,
    stock_only_summary: StrategySummary,
    rental_net_proceeds_advantage: f64,
    homeownership_summary: StrategySummary,
    rent_and_invest_summary: StrategySummary,
    live_in_net_proceeds_advantage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    rental: Option<RentalResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    live_in: Option<LiveInResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    indicators: Vec<IndicatorRow>,
}

fn build_params(cli: &Cli) -> Result<SimulationParameters, String> {
    if !cli.purchase_price.is_finite() || cli.purchase_price < 0.0 {
        return Err("--purchase-price must be >= 0".to_string());
    }

    if !cli.insurance.is_finite() || cli.insurance < 0.0 {
        return Err("--insurance must be >= 0".to_string());
    }

    if !cli.hoa.is_finite() || cli.hoa < 0.0 {
        return Err("--hoa must be >= 0".to_string());
    }

    if !cli.rent.is_finite() || cli.rent < 0.0 {
        return Err("--rent must be >= 0".to_string());
    }

    for (flag, percent) in [
        ("--down-payment", cli.down_payment),
        ("--closing-costs", cli.closing_costs),
        ("--selling-costs", cli.selling_costs),
        ("--mortgage-rate", cli.mortgage_rate),
        ("--property-tax-rate", cli.property_tax_rate),
        ("--maintenance-rate", cli.maintenance_rate),
        ("--vacancy-rate", cli.vacancy_rate),
        ("--rent-growth", cli.rent_growth),
        ("--appreciation", cli.appreciation),
        ("--stock-return", cli.stock_return),
        ("--dividend-yield", cli.dividend_yield),
        ("--tax-bracket", cli.tax_bracket),
    ] {
        if !(0.0..=100.0).contains(&percent) {
            return Err(format!("{flag} must be between 0 and 100"));
        }
    }

    let max_years = MAX_MONTHS / MONTHS_PER_YEAR;

    if !(1..=max_years).contains(&cli.mortgage_term_years) {
        return Err(format!("--mortgage-term-years must be between 1 and {max_years}"));
    }

    let horizon_months = match cli.horizon_months {
        Some(months) if !(1..=MAX_MONTHS).contains(&months) => {
            return Err(format!("--horizon-months must be between 1 and {MAX_MONTHS}"));
        }
        Some(months) => months,
        None if !(1..=max_years).contains(&cli.horizon_years) => {
            return Err(format!("--horizon-years must be between 1 and {max_years}"));
        }
        None => cli.horizon_years * MONTHS_PER_YEAR,
    };

    let params = SimulationParameters {
        purchase_price: cli.purchase_price,
        down_payment_rate: cli.down_payment / 100.0,
        closing_cost_rate: cli.closing_costs / 100.0,
        selling_cost_rate: cli.selling_costs / 100.0,
        mortgage_rate: cli.mortgage_rate / 100.0,
        mortgage_term_months: cli.mortgage_term_years * MONTHS_PER_YEAR,
        property_tax_rate: cli.property_tax_rate / 100.0,
        insurance_monthly: cli.insurance,
        hoa_monthly: cli.hoa,
        maintenance_rate: cli.maintenance_rate / 100.0,
        monthly_rent: cli.rent,
        vacancy_rate: cli.vacancy_rate / 100.0,
        rent_growth_rate: cli.rent_growth / 100.0,
        appreciation_rate: cli.appreciation / 100.0,
        stock_return_rate: cli.stock_return / 100.0,
        dividend_yield: cli.dividend_yield / 100.0,
        tax_bracket: cli.tax_bracket / 100.0,
        horizon_months,
    };
    params.validate().map_err(|e| e.to_string())?;
    Ok(params)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/rental",
            get(rental_get_handler).post(rental_post_handler),
        )
        .route(
            "/api/live-in",
            get(live_in_get_handler).post(live_in_post_handler),
        )
        .route("/api/indicators", post(indicators_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "rentvest HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/health");

    axum::serve(listener, app).await
}

/// One-shot run from command-line flags; prints a JSON report to stdout.
pub fn run_cli() -> Result<(), String> {
    let cli = Cli::parse();
    let report = build_cli_report(&cli)?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| format!("Failed to serialize report: {e}"))?;
    println!("{json}");
    Ok(())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn rental_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    rental_handler_impl(payload).await
}

async fn rental_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    rental_handler_impl(payload).await
}

async fn rental_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    debug!(horizon_months = request.params.horizon_months, "rental request");

    match simulate_rental_strategy(&request.params) {
        Ok(sim) => json_response(
            StatusCode::OK,
            build_rental_response(sim, request.resolution),
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn live_in_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    live_in_handler_impl(payload).await
}

async fn live_in_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    live_in_handler_impl(payload).await
}

async fn live_in_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };
    debug!(horizon_months = request.params.horizon_months, "live-in request");

    match simulate_live_in_strategy(&request.params) {
        Ok(sim) => json_response(
            StatusCode::OK,
            build_live_in_response(sim, request.resolution),
        ),
        Err(err) => error_response(StatusCode::BAD_REQUEST, &err.to_string()),
    }
}

async fn indicators_handler(Json(payload): Json<IndicatorsPayload>) -> Response {
    if payload.series.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "series must not be empty");
    }
    let indicators = compute_portfolio_indicators(&payload.series);
    json_response(StatusCode::OK, IndicatorsResponse { indicators })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.purchase_price {
        cli.purchase_price = v;
    }
    if let Some(v) = payload.down_payment {
        cli.down_payment = v;
    }
    if let Some(v) = payload.closing_costs {
        cli.closing_costs = v;
    }
    if let Some(v) = payload.selling_costs {
        cli.selling_costs = v;
    }

    if let Some(v) = payload.mortgage_rate {
        cli.mortgage_rate = v;
    }
    if let Some(v) = payload.mortgage_term_years {
        cli.mortgage_term_years = v;
    }

    if let Some(v) = payload.property_tax_rate {
        cli.property_tax_rate = v;
    }
    if let Some(v) = payload.insurance {
        cli.insurance = v;
    }
    if let Some(v) = payload.hoa {
        cli.hoa = v;
    }
    if let Some(v) = payload.maintenance_rate {
        cli.maintenance_rate = v;
    }

    if let Some(v) = payload.rent {
        cli.rent = v;
    }
    if let Some(v) = payload.vacancy_rate {
        cli.vacancy_rate = v;
    }
    if let Some(v) = payload.rent_growth {
        cli.rent_growth = v;
    }
    if let Some(v) = payload.appreciation {
        cli.appreciation = v;
    }

    if let Some(v) = payload.stock_return {
        cli.stock_return = v;
    }
    if let Some(v) = payload.dividend_yield {
        cli.dividend_yield = v;
    }
    if let Some(v) = payload.tax_bracket {
        cli.tax_bracket = v;
    }

    if let Some(v) = payload.horizon_years {
        cli.horizon_years = v;
    }
    if payload.horizon_months.is_some() {
        cli.horizon_months = payload.horizon_months;
    }
    if let Some(v) = payload.resolution {
        cli.resolution = v.into();
    }

    let params = build_params(&cli)?;
    Ok(ApiRequest {
        params,
        resolution: cli.resolution,
    })
}

/// Slider defaults of the dashboard.
fn default_cli_for_api() -> Cli {
    Cli {
        purchase_price: 500_000.0,
        down_payment: 20.0,
        closing_costs: 3.0,
        selling_costs: 6.0,
        mortgage_rate: 6.5,
        mortgage_term_years: 30,
        property_tax_rate: 1.2,
        insurance: 150.0,
        hoa: 200.0,
        maintenance_rate: 1.0,
        rent: 2_500.0,
        vacancy_rate: 8.3,
        rent_growth: 3.0,
        appreciation: 3.0,
        stock_return: 10.0,
        dividend_yield: 2.0,
        tax_bracket: 25.0,
        horizon_years: 30,
        horizon_months: None,
        resolution: CliResolution::Yearly,
        records: false,
        prices: None,
    }
}

fn at_resolution(records: Vec<MonthlyRecord>, resolution: CliResolution) -> Vec<MonthlyRecord> {
    match resolution {
        CliResolution::Monthly => records,
        CliResolution::Yearly => year_end_records(&records),
    }
}

fn build_rental_response(sim: RentalSimulation, resolution: CliResolution) -> RentalResponse {
    let net_proceeds_advantage = sim.net_proceeds_advantage();
    RentalResponse {
        rental: at_resolution(sim.rental, resolution),
        stock_only: at_resolution(sim.stock_only, resolution),
        rental_summary: sim.rental_summary,
        stock_only_summary: sim.stock_only_summary,
        net_proceeds_advantage,
    }
}

fn build_live_in_response(sim: LiveInSimulation, resolution: CliResolution) -> LiveInResponse {
    let net_proceeds_advantage = sim.net_proceeds_advantage();
    LiveInResponse {
        homeownership: at_resolution(sim.homeownership, resolution),
        rent_and_invest: at_resolution(sim.rent_and_invest, resolution),
        homeownership_summary: sim.homeownership_summary,
        rent_and_invest_summary: sim.rent_and_invest_summary,
        net_proceeds_advantage,
    }
}

fn indicator_rows(results: &[TickerIndicators]) -> Vec<IndicatorRow> {
    results
        .iter()
        .map(|result| {
            let snapshot = result.snapshot.as_ref();
            let returns = ReturnWindow::ALL
                .iter()
                .map(|&window| FormattedReturn {
                    window,
                    value: format_return(snapshot.and_then(|s| s.return_for(window).value())),
                })
                .collect();
            IndicatorRow {
                ticker: result.ticker.clone(),
                as_of: snapshot.map(|s| s.as_of),
                last_close: snapshot.map(|s| s.last_close),
                returns,
                volume_momentum: format_volume_momentum(
                    snapshot.and_then(|s| s.volume_momentum.value()),
                ),
                error: result.error.clone(),
            }
        })
        .collect()
}

fn load_price_series(path: &Path) -> Result<Vec<PriceSeries>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let payload = serde_json::from_str::<IndicatorsPayload>(&raw)
        .map_err(|e| format!("Invalid price file {}: {e}", path.display()))?;
    Ok(payload.series)
}

fn build_cli_report(cli: &Cli) -> Result<CliReport, String> {
    let params = build_params(cli)?;
    let rental = simulate_rental_strategy(&params).map_err(|e| e.to_string())?;
    let live_in = simulate_live_in_strategy(&params).map_err(|e| e.to_string())?;

    let indicators = match &cli.prices {
        Some(path) => indicator_rows(&compute_portfolio_indicators(&load_price_series(path)?)),
        None => Vec::new(),
    };

    let rental_net_proceeds_advantage = rental.net_proceeds_advantage();
    let live_in_net_proceeds_advantage = live_in.net_proceeds_advantage();
    let (rental_summary, stock_only_summary) = (rental.rental_summary, rental.stock_only_summary);
    let (homeownership_summary, rent_and_invest_summary) =
        (live_in.homeownership_summary, live_in.rent_and_invest_summary);

    let (rental, live_in) = if cli.records {
        (
            Some(build_rental_response(rental, cli.resolution)),
            Some(build_live_in_response(live_in, cli.resolution)),
        )
    } else {
        (None, None)
    };

    Ok(CliReport {
        parameters: params,
        rental_summary,
        stock_only_summary,
        rental_net_proceeds_advantage,
        homeownership_summary,
        rent_and_invest_summary,
        live_in_net_proceeds_advantage,
        rental,
        live_in,
        indicators,
    })
}
