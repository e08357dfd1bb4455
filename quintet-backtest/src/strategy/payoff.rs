//! Zero-premium intrinsic payoffs per unit, evaluated at spot `s`.

#[inline]
fn call(s: f64, k: f64) -> f64 {
    (s - k).max(0.0)
}

#[inline]
fn put(s: f64, k: f64) -> f64 {
    (k - s).max(0.0)
}

/// Long call and long put at the same strike.
pub fn straddle(s: f64, k: f64) -> f64 {
    call(s, k) + put(s, k)
}

/// Long put at `k1`, long call at `k2`.
pub fn strangle(s: f64, k1: f64, k2: f64) -> f64 {
    put(s, k1) + call(s, k2)
}

/// Long call at `k1`, short call at `k2`.
pub fn bull_spread(s: f64, k1: f64, k2: f64) -> f64 {
    call(s, k1) - call(s, k2)
}

/// Long put at `k1` less the short leg at `k2`, which is charged as
/// `max(s - k2, 0)`.
///
/// The long strike `k1` sits above `k2`. Between the strikes the value is
/// `k1 - s`; above `k2` the short leg turns the result negative.
pub fn bear_spread(s: f64, k1: f64, k2: f64) -> f64 {
    put(s, k1) - call(s, k2)
}

/// Long calls at `k1` and `k3`, two short calls at `k2`.
pub fn butterfly_spread(s: f64, k1: f64, k2: f64, k3: f64) -> f64 {
    call(s, k1) - 2.0 * call(s, k2) + call(s, k3)
}
