//! Pure statistical functions over return/PnL sequences.
//!
//! Every function is total: degenerate inputs (too few samples, zero
//! variance, zero drawdown) resolve to a defined sentinel instead of NaN.
//! Standard deviations are population (divide by N) so results match the
//! reference numbers bit for bit. Annualization is always an explicit
//! argument; [`TRADING_DAYS_PER_YEAR`] is the exported default, never a
//! hidden constant inside a formula.

/// Default annualization factor for daily observations.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Arithmetic mean. Empty slice -> 0.0.
#[inline]
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divide by N). Empty slice -> 0.0.
#[inline]
pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    var.sqrt()
}

/// Median with midpoint interpolation for even lengths. Empty slice -> 0.0.
pub fn median(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        0.5 * (sorted[n / 2 - 1] + sorted[n / 2])
    }
}

/// First differences: `xs[i+1] - xs[i]`.
pub fn diff(xs: &[f64]) -> Vec<f64> {
    xs.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Annualized Sharpe ratio: mean(excess) / std(excess) * sqrt(periods).
///
/// Fewer than 2 samples or zero standard deviation -> 0.0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let sd = std_dev(&excess);
    if sd == 0.0 {
        return 0.0;
    }
    mean(&excess) / sd * periods_per_year.sqrt()
}

/// Annualized Sortino ratio: like Sharpe, but the denominator is the
/// standard deviation of the strictly negative excess returns only.
///
/// No negative excess returns -> 0.0.
pub fn sortino_ratio(returns: &[f64], risk_free_rate: f64, periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let excess: Vec<f64> = returns.iter().map(|r| r - risk_free_rate).collect();
    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < 0.0).collect();
    if downside.is_empty() {
        return 0.0;
    }
    let sd = std_dev(&downside);
    if sd == 0.0 {
        return 0.0;
    }
    mean(&excess) / sd * periods_per_year.sqrt()
}

/// Maximum drawdown of the cumulative product of (1 + r), measured as the
/// minimum of (cum - peak) / peak. Always <= 0; exactly 0 when the
/// cumulative product never declines. Fewer than 2 samples -> 0.0.
pub fn max_drawdown(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mut cum = 1.0;
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;
    for &r in returns {
        cum *= 1.0 + r;
        if cum > peak {
            peak = cum;
        }
        let dd = (cum - peak) / peak;
        if dd < worst {
            worst = dd;
        }
    }
    worst
}

/// Value at Risk: the `confidence`-quantile of the return distribution,
/// linearly interpolated between order statistics. Fewer than 2 samples
/// -> 0.0.
pub fn value_at_risk(returns: &[f64], confidence: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mut sorted = returns.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = confidence.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = rank - lo as f64;
        sorted[lo] + frac * (sorted[hi] - sorted[lo])
    }
}

/// Expected shortfall: mean of the returns at or below the VaR quantile.
/// An empty tail falls back to the VaR itself.
pub fn expected_shortfall(returns: &[f64], confidence: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let var = value_at_risk(returns, confidence);
    let tail: Vec<f64> = returns.iter().copied().filter(|r| *r <= var).collect();
    if tail.is_empty() {
        var
    } else {
        mean(&tail)
    }
}

/// Calmar ratio: annualized mean return over the magnitude of the maximum
/// drawdown. Zero drawdown -> 0.0.
pub fn calmar_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let dd = max_drawdown(returns);
    if dd == 0.0 {
        return 0.0;
    }
    mean(returns) * periods_per_year / dd.abs()
}

/// Omega ratio: sum of positive excess over |sum of negative excess| at the
/// given threshold. No negative excess -> +inf when any positive excess
/// exists, else 0.0.
pub fn omega_ratio(returns: &[f64], threshold: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let mut positive = 0.0;
    let mut negative = 0.0;
    let mut has_negative = false;
    let mut has_positive = false;
    for &r in returns {
        let excess = r - threshold;
        if excess > 0.0 {
            positive += excess;
            has_positive = true;
        } else if excess < 0.0 {
            negative += excess;
            has_negative = true;
        }
    }
    if !has_negative {
        return if has_positive { f64::INFINITY } else { 0.0 };
    }
    positive / negative.abs()
}

/// Standardized third moment (biased estimator). Fewer than 3 samples or
/// zero variance -> 0.0.
pub fn skewness(returns: &[f64]) -> f64 {
    if returns.len() < 3 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let m = mean(returns);
    let mut m2 = 0.0;
    let mut m3 = 0.0;
    for &r in returns {
        let d = r - m;
        m2 += d * d;
        m3 += d * d * d;
    }
    m2 /= n;
    m3 /= n;
    if m2 <= 0.0 {
        return 0.0;
    }
    m3 / m2.powf(1.5)
}

/// Excess kurtosis: standardized fourth moment minus 3 (biased estimator).
/// Fewer than 4 samples or zero variance -> 0.0.
pub fn kurtosis(returns: &[f64]) -> f64 {
    if returns.len() < 4 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let m = mean(returns);
    let mut m2 = 0.0;
    let mut m4 = 0.0;
    for &r in returns {
        let d = r - m;
        let d2 = d * d;
        m2 += d2;
        m4 += d2 * d2;
    }
    m2 /= n;
    m4 /= n;
    if m2 <= 0.0 {
        return 0.0;
    }
    m4 / (m2 * m2) - 3.0
}

/// Annualized volatility: population std * sqrt(periods).
pub fn volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    std_dev(returns) * periods_per_year.sqrt()
}

/// Fraction of strictly positive entries. Empty slice -> 0.0.
pub fn win_rate(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    pnls.iter().filter(|p| **p > 0.0).count() as f64 / pnls.len() as f64
}

/// Profit factor: sum of profits over the magnitude of the sum of losses.
/// No losses -> +inf when any profit exists, else 0.0.
pub fn profit_factor(pnls: &[f64]) -> f64 {
    let total_profit: f64 = pnls.iter().filter(|p| **p > 0.0).sum();
    let total_loss: f64 = pnls.iter().filter(|p| **p < 0.0).map(|p| p.abs()).sum();
    if total_loss == 0.0 {
        return if total_profit > 0.0 { f64::INFINITY } else { 0.0 };
    }
    total_profit / total_loss
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpe_scale_invariance() {
        let r = vec![0.01, -0.005, 0.02, 0.015, -0.01];
        let scaled: Vec<f64> = r.iter().map(|x| x * 3.0).collect();
        let s1 = sharpe_ratio(&r, 0.0, TRADING_DAYS_PER_YEAR);
        let s2 = sharpe_ratio(&scaled, 0.0, TRADING_DAYS_PER_YEAR);
        assert!((s1 - s2).abs() < 1e-9, "sharpe not scale invariant: {s1} vs {s2}");
    }

    #[test]
    fn test_sharpe_degenerate() {
        assert_eq!(sharpe_ratio(&[0.01], 0.0, 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0, 252.0), 0.0);
    }

    #[test]
    fn test_sortino_no_downside() {
        let r = vec![0.01, 0.02, 0.03];
        assert_eq!(sortino_ratio(&r, 0.0, 252.0), 0.0);
        let mixed = vec![0.01, -0.02, 0.03, -0.01];
        assert!(sortino_ratio(&mixed, 0.0, 252.0).is_finite());
    }

    #[test]
    fn test_max_drawdown_sign() {
        let r = vec![0.05, -0.10, 0.02, -0.03, 0.08];
        let dd = max_drawdown(&r);
        assert!(dd <= 0.0);
        assert!(dd < 0.0);
    }

    #[test]
    fn test_max_drawdown_nondecreasing_is_zero() {
        let r = vec![0.01, 0.0, 0.02, 0.0, 0.005];
        assert_eq!(max_drawdown(&r), 0.0);
    }

    #[test]
    fn test_var_linear_interpolation() {
        // Sorted: [1, 2, 3, 4, 5]; 5% quantile at rank 0.2 -> 1.2
        let r = vec![3.0, 1.0, 4.0, 2.0, 5.0];
        let var = value_at_risk(&r, 0.05);
        assert!((var - 1.2).abs() < 1e-12, "var = {var}");
    }

    #[test]
    fn test_expected_shortfall_tail_mean() {
        let r = vec![-0.10, -0.02, 0.01, 0.02, 0.03];
        let var = value_at_risk(&r, 0.05);
        let es = expected_shortfall(&r, 0.05);
        assert!(es <= var);
    }

    #[test]
    fn test_calmar_zero_drawdown() {
        let r = vec![0.01, 0.02, 0.01];
        assert_eq!(calmar_ratio(&r, 252.0), 0.0);
    }

    #[test]
    fn test_omega_edges() {
        assert_eq!(omega_ratio(&[0.01, 0.02], 0.0), f64::INFINITY);
        assert_eq!(omega_ratio(&[0.0, 0.0], 0.0), 0.0);
        let mixed = vec![0.02, -0.01];
        assert!((omega_ratio(&mixed, 0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_skewness_symmetric() {
        let r = vec![-2.0, -1.0, 0.0, 1.0, 2.0];
        assert!(skewness(&r).abs() < 1e-12);
    }

    #[test]
    fn test_kurtosis_known_value() {
        // Two-point symmetric distribution: kurtosis = 1, excess = -2.
        let r = vec![-1.0, 1.0, -1.0, 1.0];
        assert!((kurtosis(&r) + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_profit_factor_edges() {
        assert_eq!(profit_factor(&[1.0, 2.0]), f64::INFINITY);
        assert_eq!(profit_factor(&[0.0, 0.0]), 0.0);
        assert_eq!(profit_factor(&[]), 0.0);
        assert!((profit_factor(&[3.0, -1.5]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_median_even_odd() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_diff() {
        assert_eq!(diff(&[1.0, 3.0, 2.0]), vec![2.0, -1.0]);
    }
}
