use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::PositionDirection;
use crate::errors::{Error, Result, ValidationError};

/// An open quantity at a single execution price.
///
/// Positive quantities are long, negative quantities are short.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseLot {
    pub quantity: Decimal,
    pub price: Decimal,
    pub opened_at: DateTime<Utc>,
}

/// Position figures derived from the lots of one ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct LotSummary {
    pub direction: PositionDirection,
    pub quantity: Decimal,
    pub total_cost_basis: Decimal,
    pub average_cost: Decimal,
    pub opened_at: DateTime<Utc>,
}

/// Oldest-first FIFO lots for one ticker.
///
/// Buys always append a lot. Sells consume lots from the front until the
/// sold quantity is used up, and any remainder opens a short lot at the sell
/// price. The net of all lots is the signed sum of every trade applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LotBook {
    lots: VecDeque<PurchaseLot>,
}

fn overflow(what: &str) -> Error {
    Error::Validation(ValidationError::InvalidInput(format!(
        "Arithmetic overflow while computing {}",
        what
    )))
}

impl LotBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lots(&self) -> impl Iterator<Item = &PurchaseLot> {
        self.lots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.lots.is_empty()
    }

    pub fn net_quantity(&self) -> Result<Decimal> {
        self.lots.iter().try_fold(Decimal::ZERO, |net, lot| {
            net.checked_add(lot.quantity)
                .ok_or_else(|| overflow("net quantity"))
        })
    }

    /// Applies a signed trade (buy positive, sell negative).
    ///
    /// Returns the signed quantity of the lot the trade opened: the full
    /// quantity for a buy, the unmatched remainder for a sell, zero otherwise.
    pub fn apply(
        &mut self,
        signed_quantity: Decimal,
        price: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Result<Decimal> {
        if signed_quantity.is_zero() {
            return Ok(Decimal::ZERO);
        }

        if signed_quantity.is_sign_positive() {
            self.lots.push_back(PurchaseLot {
                quantity: signed_quantity,
                price,
                opened_at,
            });
            return Ok(signed_quantity);
        }

        let mut remaining = signed_quantity.abs();
        while remaining > Decimal::ZERO {
            let Some(front) = self.lots.front_mut() else {
                break;
            };
            if front.quantity <= remaining {
                // A short front lot is folded into the remainder.
                remaining = remaining
                    .checked_sub(front.quantity)
                    .ok_or_else(|| overflow("sell remainder"))?;
                self.lots.pop_front();
            } else {
                front.quantity -= remaining;
                remaining = Decimal::ZERO;
            }
        }

        if remaining.is_zero() {
            return Ok(Decimal::ZERO);
        }

        self.lots.push_back(PurchaseLot {
            quantity: -remaining,
            price,
            opened_at,
        });
        Ok(-remaining)
    }

    /// Net position over the open lots, or `None` when flat.
    ///
    /// Cost basis only counts lots on the same side as the net position.
    pub fn summarize(&self) -> Result<Option<LotSummary>> {
        let net = self.net_quantity()?;
        if net.is_zero() {
            return Ok(None);
        }

        let direction = PositionDirection::from_signed(net);
        let matching: Vec<&PurchaseLot> = self
            .lots
            .iter()
            .filter(|lot| PositionDirection::from_signed(lot.quantity) == direction)
            .collect();

        let total_cost_basis = matching.iter().try_fold(Decimal::ZERO, |total, lot| {
            lot.quantity
                .abs()
                .checked_mul(lot.price)
                .and_then(|cost| total.checked_add(cost))
                .ok_or_else(|| overflow("cost basis"))
        })?;
        let quantity = net.abs();
        let average_cost = total_cost_basis
            .checked_div(quantity)
            .ok_or_else(|| overflow("average cost"))?;

        Ok(Some(LotSummary {
            direction,
            quantity,
            total_cost_basis,
            average_cost,
            opened_at: matching
                .first()
                .map(|lot| lot.opened_at)
                .unwrap_or_default(),
        }))
    }
}
