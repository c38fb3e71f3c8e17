use serde::Serialize;

use super::error::{SimulationError, SimulationResult};
use super::types::MAX_MONTHS;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmortizationStep {
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

impl AmortizationStep {
    pub fn payment(self) -> f64 {
        self.interest + self.principal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    pub principal: f64,
    pub balance: f64,
}

/// Fixed annuity payment for a fully amortizing loan.
pub fn monthly_payment(principal: f64, annual_rate: f64, term_months: u32) -> SimulationResult<f64> {
    if !principal.is_finite() || principal < 0.0 {
        return Err(SimulationError::invalid(
            "principal",
            format!("must be a finite amount >= 0, got {principal}"),
        ));
    }
    if term_months < 1 {
        return Err(SimulationError::invalid(
            "mortgageTermMonths",
            "must be at least 1 month",
        ));
    }
    if !annual_rate.is_finite() || annual_rate < 0.0 {
        return Err(SimulationError::invalid(
            "mortgageRate",
            format!("must be >= 0, got {annual_rate}"),
        ));
    }

    if annual_rate == 0.0 {
        return Ok(principal / term_months as f64);
    }

    let r = annual_rate / 12.0;
    Ok(principal * r / (1.0 - (1.0 + r).powf(-f64::from(term_months))))
}

/// One month of interest-then-principal. A zero balance stays at zero and any excess
/// payment is left to the caller.
pub fn step(balance: f64, payment: f64, annual_rate: f64) -> AmortizationStep {
    if balance <= 0.0 {
        return AmortizationStep::default();
    }

    let interest = balance * annual_rate / 12.0;
    let principal = (payment - interest).min(balance).max(0.0);

    AmortizationStep {
        interest,
        principal,
        balance: (balance - principal).max(0.0),
    }
}

/// Running loan state: the payment is fixed at origination, the balance only shrinks.
///
/// The last scheduled month retires whatever balance floating-point drift left behind,
/// so the loan is exactly zero at the end of its term.
#[derive(Debug, Clone)]
pub struct Amortization {
    balance: f64,
    payment: f64,
    annual_rate: f64,
    months_remaining: u32,
}

impl Amortization {
    pub fn new(principal: f64, annual_rate: f64, term_months: u32) -> SimulationResult<Self> {
        let payment = monthly_payment(principal, annual_rate, term_months)?;
        Ok(Self {
            balance: principal,
            payment,
            annual_rate,
            months_remaining: term_months,
        })
    }

    pub fn advance(&mut self) -> AmortizationStep {
        let mut step = step(self.balance, self.payment, self.annual_rate);
        self.months_remaining = self.months_remaining.saturating_sub(1);
        if self.months_remaining == 0 && step.balance > 0.0 {
            step.principal += step.balance;
            step.balance = 0.0;
        }
        self.balance = step.balance;
        step
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn payment(&self) -> f64 {
        self.payment
    }

    pub fn is_paid_off(&self) -> bool {
        self.balance <= 0.0
    }
}

pub fn amortization_schedule(
    principal: f64,
    annual_rate: f64,
    term_months: u32,
) -> SimulationResult<Vec<AmortizationRow>> {
    if term_months > MAX_MONTHS {
        return Err(SimulationError::invalid(
            "mortgageTermMonths",
            format!("schedule is limited to {MAX_MONTHS} months, got {term_months}"),
        ));
    }
    let mut loan = Amortization::new(principal, annual_rate, term_months)?;
    let mut rows = Vec::with_capacity(term_months as usize);
    for month in 1..=term_months {
        let step = loan.advance();
        rows.push(AmortizationRow {
            month,
            payment: step.payment(),
            interest: step.interest,
            principal: step.principal,
            balance: step.balance,
        });
    }
    Ok(rows)
}

pub fn total_interest(principal: f64, annual_rate: f64, term_months: u32) -> SimulationResult<f64> {
    Ok(amortization_schedule(principal, annual_rate, term_months)?
        .iter()
        .map(|row| row.interest)
        .sum())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn payment_matches_published_thirty_year_figure() {
        // 400k at 6.5% over 30 years is the textbook $2,528.27.
        let payment = monthly_payment(400_000.0, 0.065, 360).expect("valid loan");
        assert_approx_tol(payment, 2_528.27, 0.01);
    }

    #[test]
    fn zero_rate_payment_is_straight_line() {
        let payment = monthly_payment(120_000.0, 0.0, 240).expect("valid loan");
        assert_approx_tol(payment, 500.0, EPS);
    }

    #[test]
    fn payment_rejects_invalid_inputs() {
        let err = monthly_payment(-1.0, 0.05, 360).expect_err("negative principal");
        assert_eq!(err.field(), "principal");
        let err = monthly_payment(1_000.0, 0.05, 0).expect_err("zero term");
        assert_eq!(err.field(), "mortgageTermMonths");
        let err = monthly_payment(1_000.0, -0.05, 12).expect_err("negative rate");
        assert_eq!(err.field(), "mortgageRate");
    }

    #[test]
    fn very_long_terms_approach_interest_only() {
        let interest_only = 100_000.0 * 0.06 / 12.0;
        for term in [2_147_483_647, 3_000_000_000, u32::MAX] {
            let payment = monthly_payment(100_000.0, 0.06, term).expect("valid loan");
            assert!(payment > 0.0, "term {term} gave {payment}");
            assert_approx_tol(payment, interest_only, 1e-6);
        }

        let mut loan = Amortization::new(100_000.0, 0.06, u32::MAX).expect("valid loan");
        let first = loan.advance();
        assert!(first.principal >= 0.0);
        assert!(first.balance <= 100_000.0);
        assert!(!loan.is_paid_off());
    }

    #[test]
    fn schedule_rejects_terms_above_cap() {
        let err = amortization_schedule(100_000.0, 0.06, MAX_MONTHS + 1)
            .expect_err("oversized schedule");
        assert_eq!(err.field(), "mortgageTermMonths");
        assert!(amortization_schedule(100_000.0, 0.06, MAX_MONTHS).is_ok());
    }

    #[test]
    fn first_step_splits_interest_then_principal() {
        let payment = monthly_payment(400_000.0, 0.065, 360).expect("valid loan");
        let first = step(400_000.0, payment, 0.065);
        assert_approx_tol(first.interest, 2_166.666_666, 1e-3);
        assert_approx_tol(first.principal, payment - first.interest, EPS);
        assert_approx_tol(first.balance, 400_000.0 - first.principal, EPS);
    }

    #[test]
    fn paid_off_loan_returns_zeros() {
        assert_eq!(step(0.0, 1_000.0, 0.05), AmortizationStep::default());

        let mut loan = Amortization::new(1_000.0, 0.0, 2).expect("valid loan");
        loan.advance();
        loan.advance();
        assert!(loan.is_paid_off());
        assert_eq!(loan.advance(), AmortizationStep::default());
    }

    #[test]
    fn overpayment_only_retires_remaining_balance() {
        let last = step(100.0, 1_000.0, 0.12);
        assert_approx_tol(last.interest, 1.0, EPS);
        assert_approx_tol(last.principal, 100.0, EPS);
        assert_eq!(last.balance, 0.0);
        assert!(last.payment() < 1_000.0);
    }

    #[test]
    fn schedule_total_interest_matches_payments_minus_principal() {
        let rows = amortization_schedule(250_000.0, 0.05, 180).expect("valid loan");
        let paid: f64 = rows.iter().map(|row| row.payment).sum();
        let interest = total_interest(250_000.0, 0.05, 180).expect("valid loan");
        assert_approx_tol(paid - interest, 250_000.0, 1e-4);
        assert_eq!(rows.last().map(|row| row.balance), Some(0.0));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_balance_non_increasing_and_retired_by_term(
            principal in 0u32..2_000_000,
            rate_bp in 0u32..2_000,
            term in 1u32..480
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 10_000.0;
            let rows = amortization_schedule(principal, rate, term).expect("valid loan");
            prop_assert_eq!(rows.len(), term as usize);

            let mut previous = principal;
            for row in &rows {
                prop_assert!(row.balance <= previous);
                prop_assert!(row.balance >= 0.0);
                previous = row.balance;
            }
            prop_assert_eq!(rows.last().map(|row| row.balance), Some(0.0));
        }

        #[test]
        fn prop_payment_split_never_exceeds_fixed_payment(
            principal in 1u32..2_000_000,
            rate_bp in 0u32..2_000,
            term in 2u32..480
        ) {
            let principal = principal as f64;
            let rate = rate_bp as f64 / 10_000.0;
            let payment = monthly_payment(principal, rate, term).expect("valid loan");
            let rows = amortization_schedule(principal, rate, term).expect("valid loan");
            let tol = 1e-6_f64.max(payment * 1e-7);

            for row in &rows[..rows.len() - 1] {
                prop_assert!((row.payment - payment).abs() <= tol);
            }
            let last = rows[rows.len() - 1];
            prop_assert!(last.payment <= payment + tol);
        }
    }
}
