// src/motion/roots.rs - Closed-form polynomial roots used by the profile solvers
//
// Everything here works on the stack: root sets have a fixed capacity and
// polynomials are passed as coefficient slices, highest order first.

use std::f64::consts::PI;

/// Absolute tolerance for bracketed root polishing.
pub const TOLERANCE: f64 = 1e-14;

const EPS: f64 = f64::EPSILON;
const SQRT3_HALF: f64 = 0.866_025_403_784_438_6;

/// Fixed-capacity, insertion-ordered set of values.
#[derive(Debug, Clone, Copy)]
pub struct RootSet<T: Copy + Default, const N: usize> {
    data: [T; N],
    len: usize,
}

impl<T: Copy + Default, const N: usize> Default for RootSet<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default, const N: usize> RootSet<T, N> {
    pub fn new() -> Self {
        Self {
            data: [T::default(); N],
            len: 0,
        }
    }

    /// Adds a value; silently ignored once the capacity is reached.
    pub fn insert(&mut self, value: T) {
        if self.len < N {
            self.data[self.len] = value;
            self.len += 1;
        }
    }
}

impl<const N: usize> RootSet<f64, N> {
    /// Keeps the non-negative roots in ascending order. NaN roots are dropped.
    pub fn positive_sorted(self) -> Self {
        let mut out = Self::new();
        for x in self {
            if x >= 0.0 {
                out.insert(x);
            }
        }
        out.data[..out.len].sort_unstable_by(|a, b| a.total_cmp(b));
        out
    }
}

impl<T: Copy + Default, const N: usize> IntoIterator for RootSet<T, N> {
    type Item = T;
    type IntoIter = std::iter::Take<std::array::IntoIter<T, N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter().take(self.len)
    }
}

/// Evaluates a polynomial (highest order first) with Horner's scheme.
pub fn poly_eval(p: &[f64], x: f64) -> f64 {
    p.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Evaluates the first derivative of `p` at `x` without materialising it.
pub fn poly_deri_eval(p: &[f64], x: f64) -> f64 {
    let n = p.len().saturating_sub(1);
    p.iter()
        .take(n)
        .enumerate()
        .fold(0.0, |acc, (i, c)| acc * x + (n - i) as f64 * c)
}

/// Derivative of a monic polynomial, normalised to be monic again.
/// `M` must equal `N - 1`.
pub fn poly_monic_deri<const N: usize, const M: usize>(p: &[f64; N]) -> [f64; M] {
    debug_assert_eq!(M + 1, N);
    let n = M as f64;
    let mut out = [0.0; M];
    out[0] = 1.0;
    for i in 1..M {
        out[i] = (M - i) as f64 * p[i] / n;
    }
    out
}

/// Safe Newton iteration on a sign-changing interval `[l, h]`.
pub fn shrink_interval(p: &[f64], mut l: f64, mut h: f64) -> f64 {
    let fl = poly_eval(p, l);
    let fh = poly_eval(p, h);
    if fl == 0.0 {
        return l;
    }
    if fh == 0.0 {
        return h;
    }
    if fl > 0.0 {
        std::mem::swap(&mut l, &mut h);
    }

    let mut rts = (l + h) / 2.0;
    let mut dxold = (h - l).abs();
    let mut dx = dxold;
    let mut f = poly_eval(p, rts);
    let mut df = poly_deri_eval(p, rts);
    for _ in 0..128 {
        if ((rts - h) * df - f) * ((rts - l) * df - f) > 0.0 || (2.0 * f).abs() > (dxold * df).abs() {
            dxold = dx;
            dx = (h - l) / 2.0;
            rts = l + dx;
            if l == rts {
                break;
            }
        } else {
            dxold = dx;
            dx = f / df;
            let temp = rts;
            rts -= dx;
            if temp == rts {
                break;
            }
        }

        if dx.abs() < TOLERANCE {
            break;
        }

        f = poly_eval(p, rts);
        df = poly_deri_eval(p, rts);
        if f < 0.0 {
            l = rts;
        } else {
            h = rts;
        }
    }
    rts
}

/// All real roots of `a x^3 + b x^2 + c x + d`, degrading to the quadratic
/// and linear cases when the leading coefficients vanish.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> RootSet<f64, 3> {
    let mut roots = RootSet::new();
    let (mut a, mut b, mut c, mut d) = (a, b, c, d);

    if d.abs() < EPS {
        roots.insert(0.0);
        d = c;
        c = b;
        b = a;
        a = 0.0;
    }

    if a.abs() < EPS {
        if b.abs() < EPS {
            if c.abs() > EPS {
                roots.insert(-d / c);
            }
        } else {
            let disc = c * c - 4.0 * b * d;
            if disc >= 0.0 {
                let y = disc.sqrt();
                let inv = 1.0 / (2.0 * b);
                roots.insert((-c + y) * inv);
                roots.insert((-c - y) * inv);
            }
        }
        return roots;
    }

    let inva = 1.0 / a;
    let invaa = inva * inva;
    let bb = b * b;
    let bover3a = b / 3.0 * inva;
    let p = (3.0 * a * c - bb) / 3.0 * invaa;
    let halfq = (2.0 * bb * b - 9.0 * a * b * c + 27.0 * a * a * d) * (0.5 / 27.0) * invaa * inva;
    let yy = p * p * p / 27.0 + halfq * halfq;

    if yy > EPS {
        // One real root
        let y = yy.sqrt();
        let u = -halfq + y;
        let v = -halfq - y;
        let w = if u.abs() > v.abs() { u.cbrt() } else { v.cbrt() };
        roots.insert(w - p / (3.0 * w) - bover3a);
    } else if yy < -EPS {
        // Three distinct real roots
        let x = -halfq;
        let y = (-yy).sqrt();
        let (theta, r) = if x.abs() > EPS {
            let theta = if x > 0.0 { (y / x).atan() } else { (y / x).atan() + PI };
            (theta, (x * x - yy).sqrt())
        } else {
            (PI / 2.0, y)
        };
        let theta = theta / 3.0;
        let r = 2.0 * r.cbrt();
        let ux = theta.cos() * r;
        let uy = theta.sin() * r;
        roots.insert(ux - bover3a);
        roots.insert(-0.5 * ux - SQRT3_HALF * uy - bover3a);
        roots.insert(-0.5 * ux + SQRT3_HALF * uy - bover3a);
    } else {
        // Double root
        let w = 2.0 * (-halfq).cbrt();
        roots.insert(w - bover3a);
        roots.insert(-0.5 * w - bover3a);
    }
    roots
}

/// Resolvent cubic `x^3 + a x^2 + b x + c`; returns the roots and the number
/// of real ones (1, 2 or 3).
fn solve_resolvent(a: f64, b: f64, c: f64) -> ([f64; 3], usize) {
    let a = a / 3.0;
    let a2 = a * a;
    let q = a2 - b / 3.0;
    let r = (a * (2.0 * a2 - b) + c) / 2.0;
    let r2 = r * r;
    let q3 = q * q * q;

    if r2 < q3 {
        let qsqrt = q.sqrt();
        let t = (r / (q * qsqrt)).clamp(-1.0, 1.0);
        let q = -2.0 * qsqrt;
        let theta = t.acos() / 3.0;
        let ux = theta.cos() * q;
        let uy = theta.sin() * q;
        return ([ux - a, -0.5 * ux - SQRT3_HALF * uy - a, -0.5 * ux + SQRT3_HALF * uy - a], 3);
    }

    let mut big_a = -(r.abs() + (r2 - q3).sqrt()).cbrt();
    if r < 0.0 {
        big_a = -big_a;
    }
    let big_b = if big_a == 0.0 { 0.0 } else { q / big_a };
    let mut x = [
        (big_a + big_b) - a,
        -(big_a + big_b) / 2.0 - a,
        3.0_f64.sqrt() * (big_a - big_b) / 2.0,
    ];
    if x[2].abs() < EPS {
        x[2] = x[1];
        return (x, 2);
    }
    (x, 1)
}

/// All real roots of the monic quartic `x^4 + a x^3 + b x^2 + c x + d`.
pub fn solve_quart_monic(a: f64, b: f64, c: f64, d: f64) -> RootSet<f64, 4> {
    let mut roots = RootSet::new();

    if d.abs() < EPS {
        if c.abs() < EPS {
            roots.insert(0.0);
            let disc = a * a - 4.0 * b;
            if disc.abs() < EPS {
                roots.insert(-a / 2.0);
            } else if disc > 0.0 {
                let s = disc.sqrt();
                roots.insert((-a - s) / 2.0);
                roots.insert((-a + s) / 2.0);
            }
            return roots;
        }

        if a.abs() < EPS && b.abs() < EPS {
            roots.insert(0.0);
            roots.insert(-c.cbrt());
            return roots;
        }
    }

    let (x3, n) = solve_resolvent(-b, a * c - 4.0 * d, -a * a * d - c * c + 4.0 * b * d);
    let mut y = x3[0];
    if n != 1 {
        if x3[1].abs() > y.abs() {
            y = x3[1];
        }
        if x3[2].abs() > y.abs() {
            y = x3[2];
        }
    }

    let (p1, p2, q1, q2): (f64, f64, f64, f64);
    let disc = y * y - 4.0 * d;
    if disc.abs() < EPS {
        q1 = y / 2.0;
        q2 = q1;
        let disc = a * a - 4.0 * (b - y);
        if disc.abs() < EPS {
            p1 = a / 2.0;
            p2 = p1;
        } else {
            let s = disc.sqrt();
            p1 = (a + s) / 2.0;
            p2 = (a - s) / 2.0;
        }
    } else {
        let s = disc.sqrt();
        q1 = (y + s) / 2.0;
        q2 = (y - s) / 2.0;
        p1 = (a * q1 - c) / (q1 - q2);
        p2 = (c - a * q2) / (q1 - q2);
    }

    let eps = 16.0 * EPS;
    for (p, q) in [(p1, q1), (p2, q2)] {
        let disc = p * p - 4.0 * q;
        if disc.abs() < eps {
            roots.insert(-p / 2.0);
        } else if disc > 0.0 {
            let s = disc.sqrt();
            roots.insert((-p - s) / 2.0);
            roots.insert((-p + s) / 2.0);
        }
    }
    roots
}

/// Non-negative roots of a monic quartic given as `[a, b, c, d]`, ascending.
pub fn positive_quart_monic(p: &[f64; 4]) -> RootSet<f64, 4> {
    solve_quart_monic(p[0], p[1], p[2], p[3]).positive_sorted()
}

/// Non-negative roots of a cubic, ascending.
pub fn positive_cubic(a: f64, b: f64, c: f64, d: f64) -> RootSet<f64, 3> {
    solve_cubic(a, b, c, d).positive_sorted()
}

/// All real roots of `c[0] x^4 + ... + c[4]`, solved in the scaled variable
/// `y = x / scale` with normalised coefficients. A vanishing leading term
/// falls back to the cubic.
pub fn solve_quartic_scaled(c: &[f64; 5], scale: f64) -> RootSet<f64, 4> {
    let s2 = scale * scale;
    let mut k = [c[0] * s2 * s2, c[1] * s2 * scale, c[2] * s2, c[3] * scale, c[4]];
    let m = k.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let mut out = RootSet::new();
    if m == 0.0 || !m.is_finite() {
        if m == 0.0 {
            out.insert(0.0);
        }
        return out;
    }
    for x in k.iter_mut() {
        *x /= m;
    }

    if k[0].abs() <= 1e-12 {
        for r in solve_cubic(k[1], k[2], k[3], k[4]) {
            out.insert(r * scale);
        }
    } else {
        for r in solve_quart_monic(k[1] / k[0], k[2] / k[0], k[3] / k[0], k[4] / k[0]) {
            out.insert(r * scale);
        }
    }
    out
}

/// Newton polish of a root of `p`, stopping on relative convergence.
pub fn polish(p: &[f64], mut x: f64, steps: usize) -> f64 {
    for _ in 0..steps {
        let dv = poly_deri_eval(p, x);
        if dv == 0.0 {
            break;
        }
        let dx = poly_eval(p, x) / dv;
        x -= dx;
        if dx.abs() <= 1e-15 * x.abs() {
            break;
        }
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted<const N: usize>(set: RootSet<f64, N>) -> Vec<f64> {
        let mut v: Vec<f64> = set.into_iter().collect();
        v.sort_by(|a, b| a.total_cmp(b));
        v
    }

    #[test]
    fn cubic_three_real_roots() {
        // (x - 1)(x - 2)(x + 3) = x^3 - 7x + 6
        let r = sorted(solve_cubic(1.0, 0.0, -7.0, 6.0));
        assert_eq!(r.len(), 3);
        for (got, want) in r.iter().zip([-3.0, 1.0, 2.0]) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn cubic_degrades_to_quadratic() {
        let r = sorted(solve_cubic(0.0, 1.0, -3.0, 2.0));
        assert_eq!(r.len(), 2);
        assert!((r[0] - 1.0).abs() < 1e-12);
        assert!((r[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn quartic_four_real_roots() {
        // (x - 1)(x - 2)(x - 3)(x + 4) = x^4 - 2x^3 - 13x^2 + 38x - 24
        let r = sorted(solve_quart_monic(-2.0, -13.0, 38.0, -24.0));
        assert_eq!(r.len(), 4);
        for (got, want) in r.iter().zip([-4.0, 1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn positive_roots_are_sorted() {
        let r: Vec<f64> = positive_quart_monic(&[-2.0, -13.0, 38.0, -24.0]).into_iter().collect();
        assert_eq!(r.len(), 3);
        assert!(r.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn scaled_quartic_matches_unscaled() {
        let c = [2.0, -4.0, -26.0, 76.0, -48.0];
        let r = sorted(solve_quartic_scaled(&c, 1000.0));
        assert_eq!(r.len(), 4);
        for (got, want) in r.iter().zip([-4.0, 1.0, 2.0, 3.0]) {
            assert!((polish(&c, *got, 8) - want).abs() < 1e-9);
        }
    }

    #[test]
    fn shrink_interval_finds_bracketed_root() {
        let p = [1.0, 0.0, -2.0];
        let r = shrink_interval(&p, 0.0, 2.0);
        assert!((r - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn monic_derivative() {
        // d/dx (x^3 + 3x^2 + 6x) = 3x^2 + 6x + 6 -> x^2 + 2x + 2
        let d: [f64; 3] = poly_monic_deri(&[1.0, 3.0, 6.0, 0.0]);
        assert_eq!(d, [1.0, 2.0, 2.0]);
    }
}
