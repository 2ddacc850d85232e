//! Single running capital account compounded across trades.
//!
//! Trades must be applied in run order: instrument-major, then chronological
//! within an instrument. The balance is never reset between instruments.

use chrono::NaiveDate;

use super::simulator::TradeRecord;

pub const DEFAULT_STARTING_BALANCE: f64 = 5000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Reinvestment {
    pub code: String,
    pub entry_date: NaiveDate,
    pub amount: f64,
    pub balance_after: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalState {
    pub starting_balance: f64,
    pub final_balance: f64,
    pub total_reinvested: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapitalTracker {
    starting_balance: f64,
    balance: f64,
    total_reinvested: f64,
}

impl CapitalTracker {
    pub fn new(starting_balance: f64) -> Self {
        CapitalTracker {
            starting_balance,
            balance: starting_balance,
            total_reinvested: 0.0,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn total_reinvested(&self) -> f64 {
        self.total_reinvested
    }

    /// Compound one trade. Trades without a position leave the balance alone.
    pub fn apply(&mut self, trade: &TradeRecord) -> Option<Reinvestment> {
        if !trade.position_taken {
            return None;
        }
        let amount = trade.realized_return * self.balance;
        self.balance += amount;
        self.total_reinvested += amount;
        Some(Reinvestment {
            code: trade.code.clone(),
            entry_date: trade.entry_date,
            amount,
            balance_after: self.balance,
        })
    }

    /// Apply a batch of trades in the order given.
    pub fn replay<'a, I>(&mut self, trades: I) -> Vec<Reinvestment>
    where
        I: IntoIterator<Item = &'a TradeRecord>,
    {
        trades.into_iter().filter_map(|t| self.apply(t)).collect()
    }

    pub fn state(&self) -> CapitalState {
        CapitalState {
            starting_balance: self.starting_balance,
            final_balance: self.balance,
            total_reinvested: self.total_reinvested,
        }
    }
}
