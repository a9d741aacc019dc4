use super::{
    pnl_max_drawdown, pnl_sharpe, unit_time_grid, validate_path_inputs, CallDecision, PathResult,
    Strategy, StrategyOutcome,
};
use crate::errors::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Callable-bond strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallableBondParams {
    pub face_value: f64,
    /// Coupon paid per scheduled coupon date, as a fraction of face.
    pub coupon_rate: f64,
    /// Call dates on the normalized [0, 1] grid, in schedule order.
    pub call_times: Vec<f64>,
    /// Issuer call price at each call date, parallel to `call_times`.
    pub call_prices: Vec<f64>,
    /// Flat rate used to discount cashflows.
    pub risk_free_rate: f64,
}

impl Default for CallableBondParams {
    fn default() -> Self {
        Self {
            face_value: 100.0,
            coupon_rate: 0.03,
            call_times: vec![0.5, 1.0],
            call_prices: vec![102.0, 100.0],
            risk_free_rate: 0.05,
        }
    }
}

/// Holder of a callable bond against issuer call decisions.
///
/// Coupons are laid out on the path grid at an approximate spacing of
/// grid_len / call_count points, with the face value paid at maturity. At
/// each call date the issuer calls iff the continuation value (supplied
/// sequence, or discounted remaining cashflows as fallback) exceeds the
/// call price. Calling is absorbing: the call price replaces all later
/// cashflows and no later date can call again, though every scheduled date
/// is still recorded.
pub struct CallableBondStrategy {
    params: CallableBondParams,
}

impl CallableBondStrategy {
    pub fn new(params: CallableBondParams) -> EngineResult<Self> {
        if params.call_times.is_empty() {
            return Err(EngineError::InvalidParameter(
                "call schedule must contain at least one date".into(),
            ));
        }
        if params.call_times.len() != params.call_prices.len() {
            return Err(EngineError::ShapeMismatch(format!(
                "call schedule has {} dates but {} prices",
                params.call_times.len(),
                params.call_prices.len()
            )));
        }
        Ok(Self { params })
    }

    pub fn params(&self) -> &CallableBondParams {
        &self.params
    }

    /// Scheduled cashflows on the grid before any call adjustment: coupons
    /// every `grid_len / call_count` points (at least every point), face at
    /// maturity.
    fn scheduled_cashflows(&self, n: usize) -> Vec<f64> {
        let p = &self.params;
        let spacing = (n / p.call_times.len()).max(1);
        let coupon = p.face_value * p.coupon_rate;

        let mut cashflows = vec![0.0; n];
        for i in (0..n - 1).step_by(spacing) {
            cashflows[i] = coupon;
        }
        cashflows[n - 1] = p.face_value;
        cashflows
    }

    /// Nearest grid index for a normalized call date.
    fn grid_index(time: f64, n: usize) -> usize {
        let idx = (time * (n - 1) as f64).round();
        (idx.max(0.0) as usize).min(n - 1)
    }
}

impl Strategy for CallableBondStrategy {
    fn name(&self) -> &'static str {
        "callable_bond"
    }

    fn execute(&self, prices: &[f64], continuation: Option<&[f64]>) -> EngineResult<PathResult> {
        validate_path_inputs(prices, continuation)?;

        let p = &self.params;
        let n = prices.len();
        let times = unit_time_grid(n);

        let mut cashflows = self.scheduled_cashflows(n);
        let mut call_decisions: SmallVec<[CallDecision; 4]> = SmallVec::new();
        let mut alive = true;

        for (&call_time, &call_price) in p.call_times.iter().zip(&p.call_prices) {
            let idx = Self::grid_index(call_time, n);
            let continuation_value = match continuation {
                Some(seq) => seq[idx],
                None => (idx..n)
                    .map(|i| cashflows[i] * (-p.risk_free_rate * times[i]).exp())
                    .sum(),
            };

            let called = alive && continuation_value > call_price;
            if called {
                // The issuer redeems at the call price and all later
                // cashflows die with the bond.
                cashflows[idx] += call_price;
                for cf in cashflows.iter_mut().skip(idx + 1) {
                    *cf = 0.0;
                }
                alive = false;
            }

            call_decisions.push(CallDecision {
                time: call_time,
                call_price,
                continuation_value,
                called,
            });
        }

        let mut portfolio_values = Vec::with_capacity(n);
        let mut pnl = Vec::with_capacity(n);
        let mut discounted_sum = 0.0;
        for i in 0..n {
            discounted_sum += cashflows[i] * (-p.risk_free_rate * times[i]).exp();
            portfolio_values.push(discounted_sum);
            pnl.push(discounted_sum - p.face_value);
        }

        let present_value = discounted_sum;
        let yield_to_maturity = if p.face_value > 0.0 {
            (present_value / p.face_value - 1.0) * 100.0
        } else {
            0.0
        };
        let total_coupons: f64 = cashflows[..n - 1].iter().sum();

        let final_pnl = pnl[n - 1];
        Ok(PathResult {
            path_id: 0,
            times,
            prices: prices.to_vec(),
            portfolio_values,
            final_pnl,
            max_drawdown: pnl_max_drawdown(&pnl),
            sharpe_ratio: pnl_sharpe(&pnl),
            win_rate: if final_pnl > 0.0 { 1.0 } else { 0.0 },
            pnl,
            outcome: StrategyOutcome::CallableBond {
                cashflows,
                call_decisions,
                present_value,
                yield_to_maturity,
                called: !alive,
                total_coupons,
            },
        })
    }
}
