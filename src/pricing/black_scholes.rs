use statrs::distribution::{ContinuousCDF, Normal};

/// Black-Scholes-Merton pricing for a European call.
///
/// price = S * Phi(d1) - K * e^{-r*tau} * Phi(d2)
/// d1 = (ln(S/K) + (r + sigma^2/2) * tau) / (sigma * sqrt(tau))
/// d2 = d1 - sigma * sqrt(tau)
///
/// Used as ground truth inside the strategy engine and as the universal
/// fallback when no continuation-value sequence is supplied. Must reproduce
/// textbook values exactly (tested against literature tables below).
pub struct BlackScholes {
    /// Standard normal distribution (created once, reused)
    normal: Normal,
}

impl BlackScholes {
    pub fn new() -> Self {
        // Normal::new(0, 1) only fails if std_dev <= 0; this is safe.
        let normal = Normal::new(0.0, 1.0).unwrap_or(Normal::standard());
        Self { normal }
    }

    /// Call price. At or past expiry (tau <= 0) the price is the intrinsic
    /// value max(S - K, 0). Degenerate volatility collapses the terminal
    /// distribution to the forward, so the price is the discounted-forward
    /// intrinsic value.
    pub fn price(&self, spot: f64, strike: f64, tau: f64, rate: f64, sigma: f64) -> f64 {
        if tau <= 0.0 {
            return (spot - strike).max(0.0);
        }

        let sigma_sqrt_tau = sigma * tau.sqrt();
        let discounted_strike = strike * (-rate * tau).exp();
        if sigma_sqrt_tau < 1e-12 {
            return (spot - discounted_strike).max(0.0);
        }

        let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * tau) / sigma_sqrt_tau;
        let d2 = d1 - sigma_sqrt_tau;

        spot * self.normal.cdf(d1) - discounted_strike * self.normal.cdf(d2)
    }

    /// Hedge ratio dPrice/dS = Phi(d1). At or past expiry this degenerates
    /// to the exercise indicator: 1 if S > K else 0.
    pub fn delta(&self, spot: f64, strike: f64, tau: f64, rate: f64, sigma: f64) -> f64 {
        if tau <= 0.0 {
            return if spot > strike { 1.0 } else { 0.0 };
        }

        let sigma_sqrt_tau = sigma * tau.sqrt();
        if sigma_sqrt_tau < 1e-12 {
            let discounted_strike = strike * (-rate * tau).exp();
            return if spot > discounted_strike { 1.0 } else { 0.0 };
        }

        let d1 = ((spot / strike).ln() + (rate + 0.5 * sigma * sigma) * tau) / sigma_sqrt_tau;
        self.normal.cdf(d1)
    }
}

impl Default for BlackScholes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_one_year_textbook() {
        // Hull: S=100, K=100, r=5%, sigma=20%, T=1 -> c = 10.4506
        let bs = BlackScholes::new();
        let price = bs.price(100.0, 100.0, 1.0, 0.05, 0.2);
        assert!((price - 10.4506).abs() < 1e-3, "price = {price}");
    }

    #[test]
    fn test_hull_example_textbook() {
        // Hull: S=42, K=40, r=10%, sigma=20%, T=0.5 -> c = 4.7594
        let bs = BlackScholes::new();
        let price = bs.price(42.0, 40.0, 0.5, 0.10, 0.2);
        assert!((price - 4.7594).abs() < 1e-3, "price = {price}");
    }

    #[test]
    fn test_expiry_intrinsic() {
        let bs = BlackScholes::new();
        assert_eq!(bs.price(110.0, 100.0, 0.0, 0.05, 0.2), 10.0);
        assert_eq!(bs.price(90.0, 100.0, 0.0, 0.05, 0.2), 0.0);
        assert_eq!(bs.price(90.0, 100.0, -0.1, 0.05, 0.2), 0.0);
    }

    #[test]
    fn test_expiry_delta_indicator() {
        let bs = BlackScholes::new();
        assert_eq!(bs.delta(110.0, 100.0, 0.0, 0.05, 0.2), 1.0);
        assert_eq!(bs.delta(90.0, 100.0, 0.0, 0.05, 0.2), 0.0);
        assert_eq!(bs.delta(100.0, 100.0, 0.0, 0.05, 0.2), 0.0);
    }

    #[test]
    fn test_atm_delta_textbook() {
        // d1 = (0.05 + 0.02) / 0.2 = 0.35 -> Phi(0.35) = 0.6368
        let bs = BlackScholes::new();
        let delta = bs.delta(100.0, 100.0, 1.0, 0.05, 0.2);
        assert!((delta - 0.6368).abs() < 1e-3, "delta = {delta}");
    }

    #[test]
    fn test_zero_vol_discounted_forward() {
        let bs = BlackScholes::new();
        // S > K*e^{-rT}: price is the forward intrinsic, delta is 1
        let price = bs.price(100.0, 100.0, 1.0, 0.05, 0.0);
        let expected = 100.0 - 100.0 * (-0.05f64).exp();
        assert!((price - expected).abs() < 1e-12);
        assert_eq!(bs.delta(100.0, 100.0, 1.0, 0.05, 0.0), 1.0);
    }

    #[test]
    fn test_monotone_in_spot() {
        let bs = BlackScholes::new();
        let lo = bs.price(90.0, 100.0, 1.0, 0.05, 0.2);
        let mid = bs.price(100.0, 100.0, 1.0, 0.05, 0.2);
        let hi = bs.price(110.0, 100.0, 1.0, 0.05, 0.2);
        assert!(lo < mid && mid < hi);
    }
}
