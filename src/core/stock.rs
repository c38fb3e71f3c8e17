use super::types::SimulationParameters;

/// One month of compounding: the dividend is paid on the opening balance and reinvested
/// alongside growth and the contribution. Negative contributions are withdrawals and are
/// never floored, so the balance may go negative.
pub fn advance_month(
    balance: f64,
    monthly_return: f64,
    monthly_dividend_yield: f64,
    contribution: f64,
) -> (f64, f64) {
    let dividend = balance * monthly_dividend_yield;
    let new_balance = balance * (1.0 + monthly_return) + dividend + contribution;
    (new_balance, dividend)
}

/// Tax on a year's dividends, taken out of the balance once.
pub fn apply_annual_dividend_tax(
    balance: f64,
    dividends_this_year: f64,
    tax_bracket: f64,
) -> (f64, f64) {
    let tax_paid = dividends_this_year * tax_bracket;
    (balance - tax_paid, tax_paid)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DividendSettlement {
    pub dividends: f64,
    pub tax_paid: f64,
}

#[derive(Debug, Clone)]
pub struct StockPortfolio {
    balance: f64,
    dividends_this_year: f64,
    cumulative_dividends: f64,
    cumulative_dividend_tax: f64,
    monthly_return: f64,
    monthly_dividend_yield: f64,
    tax_bracket: f64,
}

impl StockPortfolio {
    pub fn new(initial_balance: f64, params: &SimulationParameters) -> Self {
        Self {
            balance: initial_balance,
            dividends_this_year: 0.0,
            cumulative_dividends: 0.0,
            cumulative_dividend_tax: 0.0,
            monthly_return: params.monthly_stock_return(),
            monthly_dividend_yield: params.monthly_dividend_yield(),
            tax_bracket: params.tax_bracket,
        }
    }

    /// Compounds one month and returns the dividend received.
    pub fn advance(&mut self, contribution: f64) -> f64 {
        let (balance, dividend) = advance_month(
            self.balance,
            self.monthly_return,
            self.monthly_dividend_yield,
            contribution,
        );
        self.balance = balance;
        self.dividends_this_year += dividend;
        self.cumulative_dividends += dividend;
        dividend
    }

    /// Adds cash outside the monthly compounding step, e.g. a year-end tax surplus.
    pub fn contribute(&mut self, amount: f64) {
        self.balance += amount;
    }

    /// Taxes the year's dividends out of the balance and resets the accumulator.
    pub fn settle_year(&mut self) -> DividendSettlement {
        let dividends = self.dividends_this_year;
        let (balance, tax_paid) =
            apply_annual_dividend_tax(self.balance, dividends, self.tax_bracket);
        self.balance = balance;
        self.cumulative_dividend_tax += tax_paid;
        self.dividends_this_year = 0.0;
        DividendSettlement {
            dividends,
            tax_paid,
        }
    }

    /// Closes the dividend year without touching the balance, for owners who settle the
    /// dividend tax from another source.
    pub fn close_year_untaxed(&mut self) -> f64 {
        std::mem::take(&mut self.dividends_this_year)
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn cumulative_dividends(&self) -> f64 {
        self.cumulative_dividends
    }

    pub fn cumulative_dividend_tax(&self) -> f64 {
        self.cumulative_dividend_tax
    }
}
