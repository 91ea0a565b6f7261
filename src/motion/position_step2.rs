// src/motion/position_step2.rs - Time-synchronized profile of a single position-controlled DOF
//
// Step 2 searches for a profile that reaches the target after exactly `tf`
// seconds. Every profile shape is a closed-form (or polynomial root) solution
// of the boundary conditions; the first shape that passes the kinematic check
// wins. Shapes are tried in the heading suggested by the average velocity
// first, then in the opposite heading.

use super::profile::{JerkSigns, Profile, ReachedLimits};
use super::roots::{
    RootSet, TOLERANCE, poly_deri_eval, poly_eval, poly_monic_deri, positive_cubic, positive_quart_monic,
    shrink_interval,
};

/// Boundary values and their powers, precomputed once per synchronization.
#[derive(Debug, Clone, Copy)]
pub struct PositionStep2 {
    v0: f64,
    a0: f64,
    tf: f64,
    vf: f64,
    af: f64,
    v_max: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    j_max: f64,

    pd: f64,
    tf_sq: f64,
    tf_p3: f64,
    tf_p4: f64,
    vd: f64,
    vd_sq: f64,
    vf_sq: f64,
    ad: f64,
    ad_sq: f64,
    a0_sq: f64,
    af_sq: f64,
    a0_p3: f64,
    a0_p4: f64,
    a0_p5: f64,
    a0_p6: f64,
    af_p3: f64,
    af_p4: f64,
    af_p5: f64,
    af_p6: f64,
    j_max_sq: f64,
    g1: f64,
    g2: f64,
}

impl PositionStep2 {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tf: f64,
        p0: f64,
        v0: f64,
        a0: f64,
        pf: f64,
        vf: f64,
        af: f64,
        v_max: f64,
        v_min: f64,
        a_max: f64,
        a_min: f64,
        j_max: f64,
    ) -> Self {
        let pd = pf - p0;
        let tf_sq = tf * tf;
        let vd = vf - v0;
        let ad = af - a0;
        let a0_sq = a0 * a0;
        let af_sq = af * af;
        let a0_p3 = a0 * a0_sq;
        let a0_p4 = a0_sq * a0_sq;
        let af_p3 = af * af_sq;
        let af_p4 = af_sq * af_sq;

        Self {
            v0,
            a0,
            tf,
            vf,
            af,
            v_max,
            v_min,
            a_max,
            a_min,
            j_max,
            pd,
            tf_sq,
            tf_p3: tf_sq * tf,
            tf_p4: tf_sq * tf_sq,
            vd,
            vd_sq: vd * vd,
            vf_sq: vf * vf,
            ad,
            ad_sq: ad * ad,
            a0_sq,
            af_sq,
            a0_p3,
            a0_p4,
            a0_p5: a0_p3 * a0_sq,
            a0_p6: a0_p4 * a0_sq,
            af_p3,
            af_p4,
            af_p5: af_p3 * af_sq,
            af_p6: af_p4 * af_sq,
            j_max_sq: j_max * j_max,
            g1: -pd + tf * v0,
            g2: -2.0 * pd + tf * (v0 + vf),
        }
    }

    /// Fills `profile` (which already carries start state, target and brake)
    /// with phase durations summing to `tf`. Returns `false` if no profile
    /// shape fits.
    pub fn get_profile(&self, profile: &mut Profile) -> bool {
        let up_first = self.pd > self.tf * self.v0;
        let (v_max, v_min, a_max, a_min, j_max) = if up_first {
            (self.v_max, self.v_min, self.a_max, self.a_min, self.j_max)
        } else {
            (self.v_min, self.v_max, self.a_min, self.a_max, -self.j_max)
        };

        self.try_all(profile, v_max, v_min, a_max, a_min, j_max)
            || self.try_all(profile, v_min, v_max, a_min, a_max, -j_max)
    }

    fn try_all(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        self.time_acc0_acc1_vel(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_vel(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_acc0_vel(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_acc1_vel(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_acc0_acc1(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_acc0(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_acc1(profile, v_max, v_min, a_max, a_min, j_max)
            || self.time_none(profile, v_max, v_min, a_max, a_min, j_max)
    }

    /// Both acceleration limits and the velocity limit reached.
    fn time_acc0_acc1_vel(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { a0, tf, vf, af, pd, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, a0_p4, af_p3, af_p4, j_max_sq, g1, .. } = *self;
        if (2.0*(a_max - a_min) + ad)/j_max < tf {
            let h1 = ((a0_p4 + af_p4 - 4.0*a0_p3*(2.0*a_max + a_min)/3.0 - 4.0*af_p3*(a_max + 2.0*a_min)/3.0 + 2.0*(a0_sq - af_sq)*a_max*a_max + (4.0*a0*a_max - 2.0*a0_sq)*(af_sq - 2.0*af*a_min + (a_min - a_max)*a_min + 2.0*j_max*(a_min*tf - vd)) + 2.0*af_sq*(a_min*a_min + 2.0*j_max*(a_max*tf - vd)) + 4.0*j_max*(2.0*a_min*(af*vd + j_max*g1) + (a_max*a_max - a_min*a_min)*vd + j_max*vd_sq) + 8.0*a_max*j_max_sq*(pd - tf*vf))/(a_max*a_min) + 4.0*af_sq + 2.0*a0_sq + (4.0*af + a_max - a_min)*(a_max - a_min) + 4.0*j_max*(a_min - a_max + j_max*tf - 2.0*af)*tf).sqrt() * j_max.abs()/j_max;
            profile.t[0] = (-a0 + a_max)/j_max;
            profile.t[1] = (-(af_sq - a0_sq + 2.0*a_max*a_max + a_min*(a_min - 2.0*ad - 3.0*a_max) + 2.0*j_max*(a_min*tf - vd)) + a_min*h1)/(2.0*(a_max - a_min)*j_max);
            profile.t[2] = a_max/j_max;
            profile.t[3] = (a_min - a_max + h1)/(2.0*j_max);
            profile.t[4] = -a_min/j_max;
            profile.t[5] = tf - (profile.t[0] + profile.t[1] + profile.t[2] + profile.t[3] + 2.0*profile.t[4] + af/j_max);
            profile.t[6] = profile.t[4] + af/j_max;
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc0Acc1Vel, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        if (-a0 + 4.0*a_max - af)/j_max < tf {
            profile.t[0] = (-a0 + a_max)/j_max;
            profile.t[1] = (3.0*(a0_p4 + af_p4) - 4.0*(a0_p3 + af_p3)*a_max - 4.0*af_p3*a_max + 24.0*(a0 + af)*a_max*a_max*a_max - 6.0*(af_sq + a0_sq)*(a_max*a_max - 2.0*j_max*vd) + 6.0*a0_sq*(af_sq - 2.0*af*a_max - 2.0*a_max*j_max*tf) - 12.0*a_max*a_max*(2.0*a_max*a_max - 2.0*a_max*j_max*tf + j_max*vd) - 24.0*af*a_max*j_max*vd + 12.0*j_max_sq*(2.0*a_max*g1 + vd_sq))/(12.0*a_max*j_max*(a0_sq + af_sq - 2.0*(a0 + af)*a_max + 2.0*(a_max*a_max - a_max*j_max*tf + j_max*vd)));
            profile.t[2] = a_max/j_max;
            profile.t[3] = (-a0_sq - af_sq + 2.0*a_max*(a0 + af - 2.0*a_max) - 2.0*j_max*vd)/(2.0*a_max*j_max) + tf;
            profile.t[4] = profile.t[2];
            profile.t[5] = tf - (profile.t[0] + profile.t[1] + profile.t[2] + profile.t[3] + 2.0*profile.t[4] - af/j_max);
            profile.t[6] = profile.t[4] - af/j_max;
            if profile.check(JerkSigns::Udud, ReachedLimits::Acc0Acc1Vel, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        false
    }

    /// Cruise at the velocity limit, decelerating on the acceleration limit.
    fn time_acc1_vel(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { v0, a0, tf, af, pd, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, a0_p4, af_p3, af_p4, j_max_sq, g1, .. } = *self;
        {
            let ph1 = a0_sq + af_sq - a_min*(a0 + 2.0*af - a_min) - 2.0*j_max*(vd - a_min*tf);
            let ph2 = 2.0*a_min*(j_max*g1 + af*vd) - a_min*a_min*vd + j_max*vd_sq;
            let ph3 = af_sq + a_min*(a_min - 2.0*af) - 2.0*j_max*(vd - a_min*tf);
            let mut polynom = [0.0; 4];
            polynom[0] = (2.0*(2.0*a0 - a_min))/j_max;
            polynom[1] = (4.0*a0_sq + ph1 - 3.0*a0*a_min)/j_max_sq;
            polynom[2] = (2.0*a0*ph1)/(j_max_sq*j_max);
            polynom[3] = (3.0*(a0_p4 + af_p4) - 4.0*(a0_p3 + 2.0*af_p3)*a_min + 6.0*af_sq*(a_min*a_min - 2.0*j_max*vd) + 12.0*j_max*ph2 + 6.0*a0_sq*ph3)/(12.0*j_max_sq*j_max_sq);
            let t_min = -a0/j_max;
            let t_max = ((tf + 2.0*a_min/j_max - (a0 + af)/j_max)/2.0).min((a_max - a0)/j_max);
            let roots = positive_quart_monic(&polynom);
            for mut t in roots {
                if t < t_min || t > t_max {
                    continue;
                }
                if (a0 + j_max*t).abs() > 16.0*f64::EPSILON {
                    let h0 = j_max*t*t;
                    let orig = -pd + (3.0*(a0_p4 + af_p4) - 8.0*af_p3*a_min - 4.0*a0_p3*a_min + 6.0*af_sq*(a_min*a_min + 2.0*j_max*(h0 - vd)) + 6.0*a0_sq*(af_sq - 2.0*af*a_min + a_min*a_min + 2.0*a_min*j_max*(-2.0*t + tf) + 2.0*j_max*(5.0*h0 - vd)) + 24.0*a0*j_max*t*(a0_sq + af_sq - 2.0*af*a_min + a_min*a_min + 2.0*j_max*(a_min*(-t + tf) + h0 - vd)) - 24.0*af*a_min*j_max*(h0 - vd) + 12.0*j_max*(a_min*a_min*(h0 - vd) + j_max*(h0 - vd)*(h0 - vd)))/(24.0*a_min*j_max_sq) + h0*(tf - t) + tf*v0;
                    let deriv = (a0 + j_max*t)*((a0_sq + af_sq)/(a_min*j_max) + (a_min - a0 - 2.0*af)/j_max + (4.0*a0*t + 2.0*h0 - 2.0*vd)/a_min + 2.0*tf - 3.0*t);
                    t -= orig / deriv;
                }
                let h1 = -((a0_sq + af_sq)/2.0 + j_max*(-vd + 2.0*a0*t + j_max*t*t))/a_min;
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = a0/j_max + t;
                profile.t[3] = tf - (h1 - a_min + a0 + af)/j_max - 2.0*t;
                profile.t[4] = -a_min/j_max;
                profile.t[5] = (h1 + a_min)/j_max;
                profile.t[6] = profile.t[4] + af/j_max;
                if profile.check(JerkSigns::Uddu, ReachedLimits::Acc1Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        {
            let ph1 = a0_sq - af_sq + (2.0*af - a0)*a_max - a_max*a_max - 2.0*j_max*(vd - a_max*tf);
            let ph2 = a_max*a_max + 2.0*j_max*vd;
            let ph3 = af_sq + ph2 - 2.0*a_max*(af + j_max*tf);
            let ph4 = 2.0*a_max*j_max*g1 + a_max*a_max*vd + j_max*vd_sq;
            let mut polynom = [0.0; 4];
            polynom[0] = (4.0*a0 - 2.0*a_max)/j_max;
            polynom[1] = (4.0*a0_sq - 3.0*a0*a_max + ph1)/j_max_sq;
            polynom[2] = (2.0*a0*ph1)/(j_max_sq*j_max);
            polynom[3] = (3.0*(a0_p4 + af_p4) - 4.0*(a0_p3 + 2.0*af_p3)*a_max - 24.0*af*a_max*j_max*vd + 12.0*j_max*ph4 - 6.0*a0_sq*ph3 + 6.0*af_sq*ph2)/(12.0*j_max_sq*j_max_sq);
            let t_min = -a0/j_max;
            let t_max = ((tf + ad/j_max - 2.0*a_max/j_max)/2.0).min((a_max - a0)/j_max);
            let roots = positive_quart_monic(&polynom);
            for t in roots {
                if t > t_max || t < t_min {
                    continue;
                }
                let h1 = ((a0_sq - af_sq)/2.0 + j_max_sq*t*t - j_max*(vd - 2.0*a0*t))/a_max;
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0/j_max;
                profile.t[3] = tf + (h1 + ad - a_max)/j_max - 2.0*t;
                profile.t[4] = a_max/j_max;
                profile.t[5] = -(h1 + a_max)/j_max;
                profile.t[6] = profile.t[4] - af/j_max;
                if profile.check(JerkSigns::Udud, ReachedLimits::Acc1Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        false
    }

    /// Accelerate on the acceleration limit, then cruise at the velocity limit.
    fn time_acc0_vel(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { a0, tf, vf, af, pd, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, a0_p4, af_p3, af_p4, j_max_sq, .. } = *self;
        if tf < ((-a0 + a_max)/j_max).max(0.0) + (a_max/j_max).max(0.0) {
            return false;
        }
        let ph1 = 12.0*j_max*(-a_max*a_max*vd - j_max*vd_sq + 2.0*a_max*j_max*(-pd + tf*vf));
        {
            let mut polynom = [0.0; 4];
            polynom[0] = (2.0*a_max)/j_max;
            polynom[1] = (a0_sq - af_sq + 2.0*ad*a_max + a_max*a_max + 2.0*j_max*(vd - a_max*tf))/j_max_sq;
            polynom[2] = 0.0;
            polynom[3] = -(-3.0*(a0_p4 + af_p4) + 4.0*(af_p3 + 2.0*a0_p3)*a_max - 12.0*a0*a_max*(af_sq - 2.0*j_max*vd) + 6.0*a0_sq*(af_sq - a_max*a_max - 2.0*j_max*vd) + 6.0*af_sq*(a_max*a_max - 2.0*a_max*j_max*tf + 2.0*j_max*vd) + ph1)/(12.0*j_max_sq*j_max_sq);
            let t_min = -af/j_max;
            let t_max = (tf - (2.0*a_max - a0)/j_max).min(-a_min/j_max);
            let roots = positive_quart_monic(&polynom);
            for mut t in roots {
                if t < t_min || t > t_max {
                    continue;
                }
                if t > f64::EPSILON {
                    let h1 = j_max*t*t + vd;
                    let orig = (-3.0*(a0_p4 + af_p4) + 4.0*(af_p3 + 2.0*a0_p3)*a_max - 24.0*af*a_max*j_max_sq*t*t - 12.0*a0*a_max*(af_sq - 2.0*j_max*h1) + 6.0*a0_sq*(af_sq - a_max*a_max - 2.0*j_max*h1) + 6.0*af_sq*(a_max*a_max - 2.0*a_max*j_max*tf + 2.0*j_max*h1) - 12.0*j_max*(a_max*a_max*h1 + j_max*h1*h1 + 2.0*a_max*j_max*(pd + j_max*t*t*(t - tf) - tf*vf)))/(24.0*a_max*j_max_sq);
                    let deriv = -t*(a0_sq - af_sq + 2.0*a_max*(ad - j_max*tf) + a_max*a_max + 3.0*a_max*j_max*t + 2.0*j_max*h1)/a_max;
                    t -= orig / deriv;
                }
                let h1 = ((a0_sq - af_sq)/2.0 + j_max*(j_max*t*t + vd))/a_max;
                profile.t[0] = (-a0 + a_max)/j_max;
                profile.t[1] = (h1 - a_max)/j_max;
                profile.t[2] = a_max/j_max;
                profile.t[3] = tf - (h1 + ad + a_max)/j_max - 2.0*t;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = af/j_max + t;
                if profile.check(JerkSigns::Uddu, ReachedLimits::Acc0Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        {
            let mut polynom = [0.0; 4];
            polynom[0] = (-2.0*a_max)/j_max;
            polynom[1] = -(a0_sq + af_sq - 2.0*(a0 + af)*a_max + a_max*a_max + 2.0*j_max*(vd - a_max*tf))/j_max_sq;
            polynom[2] = 0.0;
            polynom[3] = (3.0*(a0_p4 + af_p4) - 4.0*(af_p3 + 2.0*a0_p3)*a_max + 6.0*a0_sq*(af_sq + a_max*a_max + 2.0*j_max*vd) - 12.0*a0*a_max*(af_sq + 2.0*j_max*vd) + 6.0*af_sq*(a_max*a_max - 2.0*a_max*j_max*tf + 2.0*j_max*vd) - ph1)/(12.0*j_max_sq*j_max_sq);
            let t_min = af/j_max;
            let t_max = (tf - a_max/j_max).min(a_max/j_max);
            let roots = positive_quart_monic(&polynom);
            for mut t in roots {
                if t < t_min || t > t_max {
                    continue;
                }
                {
                    let h1 = j_max*t*t - vd;
                    let orig = -(3.0*(a0_p4 + af_p4) - 4.0*(2.0*a0_p3 + af_p3)*a_max + 24.0*af*a_max*j_max_sq*t*t - 12.0*a0*a_max*(af_sq - 2.0*j_max*h1) + 6.0*a0_sq*(af_sq + a_max*a_max - 2.0*j_max*h1) + 6.0*af_sq*(a_max*a_max - 2.0*j_max*(tf*a_max + h1)) + 12.0*j_max*(-a_max*a_max*h1 + j_max*h1*h1 - 2.0*a_max*j_max*(-pd + j_max*t*t*(t - tf) + tf*vf)))/(24.0*a_max*j_max_sq);
                    let deriv = t*(a0_sq + af_sq - 2.0*j_max*h1 - 2.0*(a0 + af + j_max*tf)*a_max + a_max*a_max + 3.0*a_max*j_max*t)/a_max;
                    t -= orig / deriv;
                }
                let h1 = ((a0_sq + af_sq)/2.0 + j_max*(vd - j_max*t*t))/a_max;
                profile.t[0] = (-a0 + a_max)/j_max;
                profile.t[1] = (h1 - a_max)/j_max;
                profile.t[2] = a_max/j_max;
                profile.t[3] = tf - (h1 - a0 - af + a_max)/j_max - 2.0*t;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = -(af/j_max) + t;
                if profile.check(JerkSigns::Udud, ReachedLimits::Acc0Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        false
    }

    /// Cruise at the velocity limit without reaching an acceleration limit. The
    /// cruise start solves a polynomial of degree five (UDDU) or six (UDUD),
    /// whose roots are bracketed between the extrema of its derivatives.
    fn time_vel(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { v0, a0, tf, vf, af, pd, tf_sq, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, a0_p4, a0_p5, a0_p6, af_p3, af_p4, af_p6, j_max_sq, g1, .. } = *self;
        let tz_min = (-a0/j_max).max(0.0);
        let tz_max = ((tf - a0/j_max)/2.0).min((a_max - a0)/j_max);
        if v0.abs() < f64::EPSILON && a0.abs() < f64::EPSILON && vf.abs() < f64::EPSILON && af.abs() < f64::EPSILON {
            let mut polynom = [0.0; 4];
            polynom[0] = 1.0;
            polynom[1] = -tf/2.0;
            polynom[2] = 0.0;
            polynom[3] = pd/(2.0*j_max);
            let roots = positive_cubic(polynom[0], polynom[1], polynom[2], polynom[3]);
            for mut t in roots {
                if t > tf/4.0 {
                    continue;
                }
                if t > f64::EPSILON {
                    let orig = -pd + j_max*t*t*(tf - 2.0*t);
                    let deriv = 2.0*j_max*t*(tf - 3.0*t);
                    t -= orig / deriv;
                }
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t;
                profile.t[3] = tf - 4.0*t;
                profile.t[4] = t;
                profile.t[5] = 0.0;
                profile.t[6] = t;
                if profile.check(JerkSigns::Uddu, ReachedLimits::Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        } else {
            let p1 = af_sq - 2.0*j_max*(-2.0*af*tf + j_max*tf_sq + 3.0*vd);
            let ph1 = af_p3 - 3.0*j_max_sq*g1 - 3.0*af*j_max*vd;
            let ph2 = af_p4 + 8.0*af_p3*j_max*tf + 12.0*j_max*(3.0*j_max*vd_sq - af_sq*vd + 2.0*af*j_max*(g1 - tf*vd) - 2.0*j_max_sq*tf*g1);
            let ph3 = a0*(af - j_max*tf);
            let ph4 = j_max*(-ad + j_max*tf);
            let mut polynom = [0.0; 6];
            polynom[0] = 1.0;
            polynom[1] = (15.0*a0_sq + af_sq + 4.0*af*j_max*tf - 16.0*ph3 - 2.0*j_max*(j_max*tf_sq + 3.0*vd))/(4.0*ph4);
            polynom[2] = (29.0*a0_p3 - 2.0*af_p3 - 33.0*a0*ph3 + 6.0*j_max_sq*g1 + 6.0*af*j_max*vd + 6.0*a0*p1)/(6.0*j_max*ph4);
            polynom[3] = (61.0*a0_p4 - 76.0*a0_sq*ph3 - 16.0*a0*ph1 + 30.0*a0_sq*p1 + ph2)/(24.0*j_max_sq*ph4);
            polynom[4] = (a0*(7.0*a0_p4 - 10.0*a0_sq*ph3 - 4.0*a0*ph1 + 6.0*a0_sq*p1 + ph2))/(12.0*j_max_sq*j_max*ph4);
            polynom[5] = (7.0*a0_p6 + af_p6 - 12.0*a0_p4*ph3 + 48.0*af_p3*j_max_sq*g1 - 8.0*a0_p3*ph1 - 72.0*j_max_sq*j_max*(j_max*g1*g1 + vd_sq*vd + 2.0*af*g1*vd) - 6.0*af_p4*j_max*vd + 36.0*af_sq*j_max_sq*vd_sq + 9.0*a0_p4*p1 + 3.0*a0_sq*ph2)/(144.0*j_max_sq*j_max_sq*ph4);
            let deriv: [f64; 5] = poly_monic_deri(&polynom);
            let d_extremas = positive_quart_monic(&[deriv[1], deriv[2], deriv[3], deriv[4]]);
            let mut roots = RootSet::<f64, 5>::new();
            let mut tz_current = tz_min;
            for mut tz in d_extremas {
                if tz >= tz_max {
                    continue;
                }
                let orig = poly_eval(&deriv, tz);
                if orig.abs() > TOLERANCE {
                    tz -= orig / poly_deri_eval(&deriv, tz);
                }
                let val_new = poly_eval(&polynom, tz);
                if val_new.abs() < 64.0 * (poly_deri_eval(&deriv, tz)).abs() * TOLERANCE {
                    roots.insert(tz);
                } else if poly_eval(&polynom, tz_current) * val_new < 0.0 {
                    roots.insert(shrink_interval(&polynom, tz_current, tz));
                }
                tz_current = tz;
            }
            if poly_eval(&polynom, tz_current) * poly_eval(&polynom, tz_max) < 0.0 {
                roots.insert(shrink_interval(&polynom, tz_current, tz_max));
            }
            for mut t in roots {
                {
                    let h1 = ((a0_sq + af_sq)/(2.0*j_max_sq) + (2.0*a0*t + j_max*t*t - vd)/j_max).sqrt();
                    let orig = -pd - (2.0*a0_p3 + 4.0*af_p3 + 24.0*a0*j_max*t*(af + j_max*(h1 + t - tf)) + 6.0*a0_sq*(af + j_max*(2.0*t - tf)) + 6.0*(a0_sq + af_sq)*j_max*h1 + 12.0*af*j_max*(j_max*t*t - vd) + 12.0*j_max_sq*(j_max*t*t*(h1 + t - tf) - tf*v0 - h1*vd))/(12.0*j_max_sq);
                    let deriv_newton = -(a0 + j_max*t)*(3.0*(h1 + t) - 2.0*tf + (a0 + 2.0*af)/j_max);
                    t -= orig / deriv_newton;
                }
                if t > tf || t.is_nan() {
                    continue;
                }
                let h1 = ((a0_sq + af_sq)/(2.0*j_max_sq) + (t*(2.0*a0 + j_max*t) - vd)/j_max).sqrt();
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0/j_max;
                profile.t[3] = tf - 2.0*(t + h1) - (a0 + af)/j_max;
                profile.t[4] = h1;
                profile.t[5] = 0.0;
                profile.t[6] = h1 + af/j_max;
                if profile.check(JerkSigns::Uddu, ReachedLimits::Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        {
            let ph1 = af_sq - 2.0*j_max*(2.0*af*tf + j_max*tf_sq - 3.0*vd);
            let ph2 = af_p3 - 3.0*j_max_sq*g1 + 3.0*af*j_max*vd;
            let ph3 = 2.0*j_max*tf*g1 + 3.0*vd_sq;
            let ph4 = af_p4 - 8.0*af_p3*j_max*tf + 12.0*j_max*(j_max*ph3 + af_sq*vd + 2.0*af*j_max*(g1 - tf*vd));
            let ph5 = af + j_max*tf;
            let mut polynom = [0.0; 7];
            polynom[0] = 1.0;
            polynom[1] = (5.0*a0 - ph5)/j_max;
            polynom[2] = (39.0*a0_sq - ph1 - 16.0*a0*ph5)/(4.0*j_max_sq);
            polynom[3] = (55.0*a0_p3 - 33.0*a0_sq*ph5 - 6.0*a0*ph1 + 2.0*ph2)/(6.0*j_max_sq*j_max);
            polynom[4] = (101.0*a0_p4 + ph4 - 76.0*a0_p3*ph5 - 30.0*a0_sq*ph1 + 16.0*a0*ph2)/(24.0*j_max_sq*j_max_sq);
            polynom[5] = (a0*(11.0*a0_p4 + ph4 - 10.0*a0_p3*ph5 - 6.0*a0_sq*ph1 + 4.0*a0*ph2))/(12.0*j_max_sq*j_max_sq*j_max);
            polynom[6] = (11.0*a0_p6 - af_p6 - 12.0*a0_p5*ph5 - 48.0*af_p3*j_max_sq*g1 - 9.0*a0_p4*ph1 + 72.0*j_max_sq*j_max*(j_max*g1*g1 - vd_sq*vd - 2.0*af*g1*vd) - 6.0*af_p4*j_max*vd - 36.0*af_sq*j_max_sq*vd_sq + 8.0*a0_p3*ph2 + 3.0*a0_sq*ph4)/(144.0*j_max_sq*j_max_sq*j_max_sq);
            let deriv: [f64; 6] = poly_monic_deri(&polynom);
            let dderiv: [f64; 5] = poly_monic_deri(&deriv);
            let mut dd_tz_current = tz_min;
            let mut dd_tz_intervals = RootSet::<(f64, f64), 6>::new();
            let dd_extremas = positive_quart_monic(&[dderiv[1], dderiv[2], dderiv[3], dderiv[4]]);
            for mut tz in dd_extremas {
                if tz >= tz_max {
                    continue;
                }
                let orig = poly_eval(&dderiv, tz);
                if orig.abs() > TOLERANCE {
                    tz -= orig / poly_deri_eval(&dderiv, tz);
                }
                if poly_eval(&deriv, dd_tz_current) * poly_eval(&deriv, tz) < 0.0 {
                    dd_tz_intervals.insert((dd_tz_current, tz));
                }
                dd_tz_current = tz;
            }
            if poly_eval(&deriv, dd_tz_current) * poly_eval(&deriv, tz_max) < 0.0 {
                dd_tz_intervals.insert((dd_tz_current, tz_max));
            }
            let mut roots = RootSet::<f64, 6>::new();
            let mut tz_current = tz_min;
            for interval in dd_tz_intervals {
                let tz = shrink_interval(&deriv, interval.0, interval.1);
                if tz >= tz_max {
                    continue;
                }
                let p_val = poly_eval(&polynom, tz);
                if p_val.abs() < 64.0 * (poly_eval(&dderiv, tz)).abs() * TOLERANCE {
                    roots.insert(tz);
                } else if poly_eval(&polynom, tz_current) * p_val < 0.0 {
                    roots.insert(shrink_interval(&polynom, tz_current, tz));
                }
                tz_current = tz;
            }
            if poly_eval(&polynom, tz_current) * poly_eval(&polynom, tz_max) < 0.0 {
                roots.insert(shrink_interval(&polynom, tz_current, tz_max));
            }
            for mut t in roots {
                {
                    let mut h1 = ((af_sq - a0_sq)/(2.0*j_max_sq) - ((2.0*a0 + j_max*t)*t - vd)/j_max).sqrt();
                    let mut orig = -pd + (af_p3 - a0_p3 + 3.0*a0_sq*j_max*(tf - 2.0*t))/(6.0*j_max_sq) + (2.0*a0 + j_max*t)*t*(tf - t) + (j_max*h1 - af)*h1*h1 + tf*v0;
                    let mut deriv_newton = (a0 + j_max*t)*(2.0*(af + j_max*tf) - 3.0*j_max*(h1 + t) - a0)/j_max;
                    t -= orig / deriv_newton;
                    h1 = ((af_sq - a0_sq)/(2.0*j_max_sq) - ((2.0*a0 + j_max*t)*t - vd)/j_max).sqrt();
                    orig = -pd + (af_p3 - a0_p3 + 3.0*a0_sq*j_max*(tf - 2.0*t))/(6.0*j_max_sq) + (2.0*a0 + j_max*t)*t*(tf - t) + (j_max*h1 - af)*h1*h1 + tf*v0;
                    if orig.abs() > 1e-9 {
                        deriv_newton = (a0 + j_max*t)*(2.0*(af + j_max*tf) - 3.0*j_max*(h1 + t) - a0)/j_max;
                        t -= orig / deriv_newton;
                    }
                }
                let h1 = ((af_sq - a0_sq)/(2.0*j_max_sq) - ((2.0*a0 + j_max*t)*t - vd)/j_max).sqrt();
                profile.t[0] = t;
                profile.t[1] = 0.0;
                profile.t[2] = t + a0/j_max;
                profile.t[3] = tf - 2.0*(t + h1) + ad/j_max;
                profile.t[4] = h1;
                profile.t[5] = 0.0;
                profile.t[6] = h1 - af/j_max;
                if profile.check(JerkSigns::Udud, ReachedLimits::Vel, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
        }
        false
    }

    fn time_acc0_acc1(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { v0, a0, tf, vf, af, pd, tf_sq, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, af_p3, g1, g2, .. } = *self;
        if a0.abs() < f64::EPSILON && af.abs() < f64::EPSILON {
            let h1 = 2.0*a_min*g1 + vd_sq + a_max*(2.0*pd + a_min*tf_sq - 2.0*tf*vf);
            let h2 = (a_max - a_min)*(-a_min*vd + a_max*(a_min*tf - vd));
            let jf = h2/h1;
            profile.t[0] = a_max/jf;
            profile.t[1] = (-2.0*a_max*h1 + a_min*a_min*g2)/h2;
            profile.t[2] = profile.t[0];
            profile.t[3] = 0.0;
            profile.t[4] = -a_min/jf;
            profile.t[5] = tf - (2.0*profile.t[0] + profile.t[1] + 2.0*profile.t[4]);
            profile.t[6] = profile.t[4];
            return profile.check_with_jerk_limit(JerkSigns::Uddu, ReachedLimits::Acc0Acc1, jf, v_max, v_min, a_max, a_min, j_max);
        }
        {
            let h1 = (144.0*((a_max - a_min)*(-a_min*vd + a_max*(a_min*tf - vd)) - af_sq*(a_max*tf - vd) + 2.0*af*a_min*(a_max*tf - vd) + a0_sq*(a_min*tf + v0 - vf) - 2.0*a0*a_max*(a_min*tf - vd)).powi(2) + 48.0*ad*(3.0*a0_p3 - 3.0*af_p3 + 12.0*a_max*a_min*(-a_max + a_min) + 4.0*af_sq*(a_max + 2.0*a_min) + a0*(-3.0*af_sq + 8.0*af*(a_min - a_max) + 6.0*(a_max*a_max + 2.0*a_max*a_min - a_min*a_min)) + 6.0*af*(a_max*a_max - 2.0*a_max*a_min - a_min*a_min) + a0_sq*(3.0*af - 4.0*(2.0*a_max + a_min)))*(2.0*a_min*g1 + vd*vd + a_max*(2.0*pd + a_min*tf*tf - 2.0*tf*vf))).sqrt();
            let jf = -(3.0*af_sq*a_max*tf - 3.0*a0_sq*a_min*tf - 6.0*ad*a_max*a_min*tf + 3.0*a_max*a_min*(a_min - a_max)*tf + 3.0*(a0_sq - af_sq)*vd + 6.0*vd*(af*a_min - a0*a_max) + 3.0*(a_max*a_max - a_min*a_min)*vd + h1/4.0)/(6.0*(2.0*a_min*g1 + vd*vd + a_max*(2.0*pd + a_min*tf_sq - 2.0*tf*vf)));
            profile.t[0] = (a_max - a0)/jf;
            profile.t[1] = (a0_sq - af_sq + 2.0*ad*a_min - 2.0*(a_max*a_max - 2.0*a_max*a_min + a_min*a_min + a_min*jf*tf - jf*vd))/(2.0*(a_max - a_min)*jf);
            profile.t[2] = a_max/jf;
            profile.t[3] = 0.0;
            profile.t[4] = -a_min/jf;
            profile.t[5] = tf - (profile.t[0] + profile.t[1] + profile.t[2] + 2.0*profile.t[4] + af/jf);
            profile.t[6] = profile.t[4] + af/jf;
            if profile.check_with_jerk_limit(JerkSigns::Uddu, ReachedLimits::Acc0Acc1, jf, v_max, v_min, a_max, a_min, j_max) {
                return true;
            }
        }
        false
    }

    fn time_acc1(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { a0, tf, vf, af, pd, tf_sq, vd, vd_sq, ad, a0_sq, af_sq, a0_p3, a0_p4, af_p3, af_p4, j_max_sq, g1, g2, .. } = *self;
        {
            let h0 = (j_max_sq*(a0_p4 + af_p4 - 4.0*af_p3*j_max*tf + 6.0*af_sq*j_max_sq*tf_sq - 4.0*a0_p3*(af - j_max*tf) + 6.0*a0_sq*(af - j_max*tf)*(af - j_max*tf) + 24.0*af*j_max_sq*g1 - 4.0*a0*(af_p3 - 3.0*af_sq*j_max*tf + 6.0*j_max_sq*(-pd + tf*vf)) - 12.0*j_max_sq*(-vd_sq + j_max*tf*g2))/3.0).sqrt()/j_max;
            let h1 = ((a0_sq + af_sq - 2.0*a0*af - 2.0*ad*j_max*tf + 2.0*h0)/j_max_sq + tf_sq).sqrt();
            profile.t[0] = -(a0_sq + af_sq + 2.0*a0*(j_max*tf - af) - 2.0*j_max*vd + h0)/(2.0*j_max*(-ad + j_max*tf));
            profile.t[1] = 0.0;
            profile.t[2] = (tf - h1)/2.0 - ad/(2.0*j_max);
            profile.t[3] = 0.0;
            profile.t[4] = 0.0;
            profile.t[5] = h1;
            profile.t[6] = tf - (profile.t[0] + profile.t[2] + profile.t[5]);
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc1, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let h0 = (j_max_sq*(a0_p4 + af_p4 + 4.0*(af_p3 - a0_p3)*j_max*tf + 6.0*af_sq*j_max_sq*tf_sq + 6.0*a0_sq*(af + j_max*tf)*(af + j_max*tf) + 24.0*af*j_max_sq*g1 - 4.0*a0*(a0_sq*af + af_p3 + 3.0*af_sq*j_max*tf + 6.0*j_max_sq*(-pd + tf*vf)) + 12.0*j_max_sq*(vd_sq + j_max*tf*g2))/3.0).sqrt()/j_max;
            let h1 = ((a0_sq + af_sq - 2.0*a0*af + 2.0*ad*j_max*tf + 2.0*h0)/j_max_sq + tf_sq).sqrt();
            profile.t[0] = 0.0;
            profile.t[1] = 0.0;
            profile.t[2] = -(a0_sq + af_sq - 2.0*a0*af + 2.0*j_max*(vd - a0*tf) + h0)/(2.0*j_max*(ad + j_max*tf));
            profile.t[3] = 0.0;
            profile.t[4] = ad/(2.0*j_max) + (tf - h1)/2.0;
            profile.t[5] = h1;
            profile.t[6] = tf - (profile.t[5] + profile.t[4] + profile.t[2]);
            if profile.check(JerkSigns::Udud, ReachedLimits::Acc1, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let h0a = a0_p3 - af_p3 - 3.0*a0_sq*a_min + 3.0*a_min*a_min*(a0 + j_max*tf) + 3.0*af*a_min*(-a_min - 2.0*j_max*tf) - 3.0*af_sq*(-a_min - j_max*tf) - 3.0*j_max_sq*(-2.0*pd - a_min*tf_sq + 2.0*tf*vf);
            let h0b = a0_sq + af_sq - 2.0*(a0 + af)*a_min + 2.0*(a_min*a_min - j_max*(-a_min*tf + vd));
            let h0c = a0_p4 + 3.0*af_p4 - 4.0*(a0_p3 + 2.0*af_p3)*a_min + 6.0*a0_sq*a_min*a_min + 6.0*af_sq*(a_min*a_min - 2.0*j_max*vd) + 12.0*j_max*(2.0*a_min*j_max*g1 - a_min*a_min*vd + j_max*vd_sq) + 24.0*af*a_min*j_max*vd - 4.0*a0*(af_p3 - 3.0*af*a_min*(-a_min - 2.0*j_max*tf) + 3.0*af_sq*(-a_min - j_max*tf) + 3.0*j_max*(-a_min*a_min*tf + j_max*(-2.0*pd - a_min*tf_sq + 2.0*tf*vf)));
            let h1 = j_max.abs()/j_max*(4.0*h0a*h0a - 6.0*h0b*h0c).sqrt();
            let h2 = 6.0*j_max*h0b;
            profile.t[0] = 0.0;
            profile.t[1] = 0.0;
            profile.t[2] = (2.0*h0a + h1)/h2;
            profile.t[3] = -(a0_sq + af_sq - 2.0*(a0 + af)*a_min + 2.0*(a_min*a_min + a_min*j_max*tf - j_max*vd))/(2.0*j_max*(a0 - a_min - j_max*profile.t[2]));
            profile.t[4] = (a0 - a_min)/j_max - profile.t[2];
            profile.t[5] = tf - (profile.t[2] + profile.t[3] + profile.t[4] + (af - a_min)/j_max);
            profile.t[6] = (af - a_min)/j_max;
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc1, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let h0a = -a0_p3 + af_p3 + 3.0*(a0_sq - af_sq)*a_max - 3.0*ad*a_max*a_max - 6.0*af*a_max*j_max*tf + 3.0*af_sq*j_max*tf + 3.0*j_max*(a_max*a_max*tf + j_max*(-2.0*pd - a_max*tf_sq + 2.0*tf*vf));
            let h0b = a0_sq - af_sq + 2.0*ad*a_max + 2.0*j_max*(a_max*tf - vd);
            let h0c = a0_p4 + 3.0*af_p4 - 4.0*(a0_p3 + 2.0*af_p3)*a_max + 6.0*a0_sq*a_max*a_max - 24.0*af*a_max*j_max*vd + 12.0*j_max*(2.0*a_max*j_max*g1 + j_max*vd_sq + a_max*a_max*vd) + 6.0*af_sq*(a_max*a_max + 2.0*j_max*vd) - 4.0*a0*(af_p3 + 3.0*af*a_max*(a_max - 2.0*j_max*tf) - 3.0*af_sq*(a_max - j_max*tf) + 3.0*j_max*(a_max*a_max*tf + j_max*(-2.0*pd - a_max*tf_sq + 2.0*tf*vf)));
            let h1 = j_max.abs()/j_max*(4.0*h0a*h0a - 6.0*h0b*h0c).sqrt();
            let h2 = 6.0*j_max*h0b;
            profile.t[0] = 0.0;
            profile.t[1] = 0.0;
            profile.t[2] = -(2.0*h0a + h1)/h2;
            profile.t[3] = 2.0*h1/h2;
            profile.t[4] = (a_max - a0)/j_max + profile.t[2];
            profile.t[5] = tf - (profile.t[2] + profile.t[3] + profile.t[4] + (-af + a_max)/j_max);
            profile.t[6] = (-af + a_max)/j_max;
            if profile.check(JerkSigns::Udud, ReachedLimits::Acc1, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        false
    }

    fn time_acc0(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { v0, a0, tf, af, pd, tf_sq, vd, ad, ad_sq, a0_sq, af_sq, a0_p3, af_p3, j_max_sq, g1, g2, .. } = *self;
        {
            let h1 = (ad_sq/(2.0*j_max_sq) - ad*(a_max - a0)/(j_max_sq) + (a_max*tf - vd)/j_max).sqrt();
            profile.t[0] = (a_max - a0)/j_max;
            profile.t[1] = tf - ad/j_max - 2.0*h1;
            profile.t[2] = h1;
            profile.t[3] = 0.0;
            profile.t[4] = (af - a_max)/j_max + h1;
            profile.t[5] = 0.0;
            profile.t[6] = 0.0;
            if profile.check(JerkSigns::Udud, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let h0a = -a0_sq + af_sq - 2.0*ad*a_max + 2.0*j_max*(a_max*tf - vd);
            let h0b = a0_p3 + 2.0*af_p3 - 6.0*af_sq*a_max - 3.0*a0_sq*(af - j_max*tf) - 3.0*a0*a_max*(a_max - 2.0*af + 2.0*j_max*tf) - 3.0*j_max*(j_max*(-2.0*pd + a_max*tf_sq + 2.0*tf*v0) + a_max*(a_max*tf - 2.0*vd)) + 3.0*af*(a_max*a_max + 2.0*a_max*j_max*tf - 2.0*j_max*vd);
            let h0 = j_max.abs()*(4.0*h0b*h0b - 18.0*h0a*h0a*h0a).sqrt();
            let h1 = 3.0*j_max*h0a;
            profile.t[0] = (-a0 + a_max)/j_max;
            profile.t[1] = (-a0_p3 + af_p3 + af_sq*(-6.0*a_max + 3.0*j_max*tf) + a0_sq*(-3.0*af + 6.0*a_max + 3.0*j_max*tf) + 6.0*af*(a_max*a_max - j_max*vd) + 3.0*a0*(af_sq - 2.0*(a_max*a_max + j_max*vd)) - 6.0*j_max*(a_max*(a_max*tf - 2.0*vd) + j_max*g2))/h1;
            profile.t[2] = -(ad + h0/h1)/(2.0*j_max) + tf/2.0 - profile.t[1]/2.0;
            profile.t[3] = h0/(j_max*h1);
            profile.t[4] = 0.0;
            profile.t[5] = 0.0;
            profile.t[6] = tf - (profile.t[0] + profile.t[1] + profile.t[2] + profile.t[3]);
            if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let h0a = a0_p3 + 2.0*af_p3 - 6.0*(af_sq + a_max*a_max)*a_max - 6.0*(a0 + af)*a_max*j_max*tf + 9.0*a_max*a_max*(af + j_max*tf) + 3.0*a0*a_max*(-2.0*af + 3.0*a_max) + 3.0*a0_sq*(af - 2.0*a_max + j_max*tf) - 6.0*j_max_sq*g1 + 6.0*(af - a_max)*j_max*vd - 3.0*a_max*j_max_sq*tf_sq;
            let h0b = a0_sq + af_sq + 2.0*(a_max*a_max - (a0 + af)*a_max + j_max*(vd - a_max*tf));
            let h1 = j_max.abs()/j_max*(4.0*h0a*h0a - 18.0*h0b*h0b*h0b).sqrt();
            let h2 = 6.0*j_max*h0b;
            profile.t[0] = (-a0 + a_max)/j_max;
            profile.t[1] = ad/j_max - 2.0 * profile.t[0] - (2.0*h0a - h1)/h2 + tf;
            profile.t[2] = -(2.0*h0a + h1)/h2;
            profile.t[3] = (2.0*h0a - h1)/h2;
            profile.t[4] = tf - (profile.t[0] + profile.t[1] + profile.t[2] + profile.t[3]);
            profile.t[5] = 0.0;
            profile.t[6] = 0.0;
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc0, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        false
    }

    /// No limit reached. Degenerate three-phase shapes are tried last.
    fn time_none(&self, profile: &mut Profile, v_max: f64, v_min: f64, a_max: f64, a_min: f64, j_max: f64) -> bool {
        let Self { v0, a0, tf, vf, af, pd, tf_sq, tf_p3, tf_p4, vd, vd_sq, vf_sq, ad, ad_sq, a0_sq, af_sq, a0_p3, a0_p4, a0_p5, a0_p6, af_p3, af_p4, af_p5, af_p6, j_max_sq, g1, g2, .. } = *self;
        if v0.abs() < f64::EPSILON && a0.abs() < f64::EPSILON && af.abs() < f64::EPSILON {
            let h1 = (tf_sq*vf_sq + (4.0*pd - tf*vf)*(4.0*pd - tf*vf)).sqrt();
            let jf = 4.0*(4.0*pd - 2.0*tf*vf + h1)/tf_p3;
            profile.t[0] = tf/4.0;
            profile.t[1] = 0.0;
            profile.t[2] = 2.0*profile.t[0];
            profile.t[3] = 0.0;
            profile.t[4] = 0.0;
            profile.t[5] = 0.0;
            profile.t[6] = profile.t[0];
            if profile.check_with_jerk_limit(JerkSigns::Uddu, ReachedLimits::None, jf, v_max, v_min, a_max, a_min, j_max) {
                return true;
            }
        }
        if a0.abs() < f64::EPSILON && af.abs() < f64::EPSILON {
            {
                {
                    let mut polynom = [0.0; 4];
                    polynom[0] = -2.0*tf;
                    polynom[1] = 2.0*vd/j_max + tf_sq;
                    polynom[2] = 4.0*(pd - tf*vf)/j_max;
                    polynom[3] = (vd_sq + j_max*tf*g2)/(j_max_sq);
                    let roots = positive_quart_monic(&polynom);
                    for mut t in roots {
                        if t > tf/2.0 || t > (a_max - a0)/j_max {
                            continue;
                        }
                        {
                            let h1 = (j_max*t*(t - tf) + vd)/(j_max*(2.0*t - tf));
                            let h2 = (2.0*j_max*t*(t - tf) + j_max*tf_sq - 2.0*vd)/(j_max*(2.0*t - tf)*(2.0*t - tf));
                            let orig = (-2.0*pd + 2.0*tf*v0 + h1*h1*j_max*(tf - 2.0*t) + j_max*tf*(2.0*h1*t - t*t - (h1 - t)*tf))/2.0;
                            let deriv = (j_max*tf*(2.0*t - tf)*(h2 - 1.0))/2.0 + h1*j_max*(tf - (2.0*t - tf)*h2 - h1);
                            t -= orig / deriv;
                        }
                        profile.t[0] = t;
                        profile.t[1] = 0.0;
                        profile.t[2] = (j_max*t*(t - tf) + vd)/(j_max*(2.0*t - tf));
                        profile.t[3] = tf - 2.0*t;
                        profile.t[4] = t - profile.t[2];
                        profile.t[5] = 0.0;
                        profile.t[6] = 0.0;
                        if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                            return true;
                        }
                    }
                }
            }
        }
        {
            let h0 = (2.0*j_max_sq*(2.0*(a0_p3 - af_p3 - 3.0*af_sq*j_max*tf + 9.0*af*j_max_sq*tf_sq - 3.0*a0_sq*(af + j_max*tf) + 3.0*a0*(af + j_max*tf).powi(2) + 3.0*j_max_sq*(8.0*pd + j_max*tf_sq*tf - 8.0*tf*vf)).powi(2) - 3.0*(a0_sq + af_sq - 2.0*af*j_max*tf - 2.0*a0*(af + j_max*tf) - j_max*(j_max*tf_sq + 4.0*v0 - 4.0*vf))*(a0_p4 + af_p4 + 4.0*af_p3*j_max*tf + 6.0*af_sq*j_max_sq*tf_sq - 3.0*j_max_sq*j_max_sq*tf_sq*tf_sq - 4.0*a0_p3*(af + j_max*tf) + 6.0*a0_sq*(af + j_max*tf).powi(2) - 12.0*af*j_max_sq*(8.0*pd + j_max*tf_sq*tf - 8.0*tf*v0) + 48.0*j_max_sq*vd_sq + 48.0*j_max_sq*j_max*tf*g2 - 4.0*a0*(af_p3 + 3.0*af_sq*j_max*tf - 9.0*af*j_max_sq*tf_sq - 3.0*j_max_sq*(8.0*pd + j_max*tf_sq*tf - 8.0*tf*vf))))).sqrt()/j_max;
            let h1 = 12.0*j_max*(-a0_sq - af_sq + 2.0*af*j_max*tf + 2.0*a0*(af + j_max*tf) + j_max*(j_max*tf_sq + 4.0*v0 - 4.0*vf));
            let h2 = -4.0*a0_p3 + 4.0*af_p3 + 12.0*a0_sq*af - 12.0*a0*af_sq + 48.0*j_max_sq*pd + 12.0*(a0_sq - af_sq)*j_max*tf - 24.0*j_max_sq*tf*(v0 + vf) + 24.0*ad*j_max*vd;
            let h3 = 2.0*a0_p3 - 2.0*af_p3 - 6.0*a0_sq*af + 6.0*a0*af_sq;
            profile.t[0] = (h3 - 48.0*j_max_sq*(tf*vf - pd) - 6.0*(a0_sq + af_sq)*j_max*tf + 12.0*a0*af*j_max*tf + 6.0*(a0 + 3.0*af + j_max*tf)*tf_sq*j_max_sq - h0)/h1;
            profile.t[1] = 0.0;
            profile.t[2] = (h2 + h0)/h1;
            profile.t[3] = 0.0;
            profile.t[4] = (-h2 + h0)/h1;
            profile.t[5] = 0.0;
            profile.t[6] = (-h3 + 48.0*j_max_sq*(tf*v0 - pd) - 6.0*(a0_sq + af_sq)*j_max*tf + 12.0*a0*af*j_max*tf + 6.0*(af + 3.0*a0 + j_max*tf)*tf_sq*j_max_sq - h0)/h1;
            if profile.check(JerkSigns::Udud, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            {
                let ph1 = af + j_max*tf;
                let mut polynom = [0.0; 4];
                polynom[0] = -2.0*(ad + j_max*tf)/j_max;
                polynom[1] = 2.0*(a0_sq + af_sq + j_max*(af*tf + vd) - 2.0*a0*ph1)/j_max_sq + tf_sq;
                polynom[2] = 2.0*(a0_p3 - af_p3 - 3.0*af_sq*j_max*tf + 3.0*a0*ph1*(ph1 - a0) - 6.0*j_max_sq*(-pd + tf*vf))/(3.0*j_max_sq*j_max);
                polynom[3] = (a0_p4 + af_p4 + 4.0*af_p3*j_max*tf - 4.0*a0_p3*ph1 + 6.0*a0_sq*ph1*ph1 + 24.0*j_max_sq*af*g1 - 4.0*a0*(af_p3 + 3.0*af_sq*j_max*tf + 6.0*j_max_sq*(-pd + tf*vf)) + 6.0*j_max_sq*af_sq*tf_sq + 12.0*j_max_sq*(vd_sq + j_max*tf*g2))/(12.0*j_max_sq*j_max_sq);
                let t_min = ad/j_max;
                let t_max = ((a_max - a0)/j_max).min((ad/j_max + tf) / 2.0);
                let roots = positive_quart_monic(&polynom);
                for mut t in roots {
                    if t < t_min || t > t_max {
                        continue;
                    }
                    {
                        let h0 = j_max*(2.0*t - tf) - ad;
                        let h1 = (ad_sq - 2.0*af*j_max*t + 2.0*a0*j_max*(t - tf) + 2.0*j_max*(j_max*t*(t - tf) + vd))/(2.0*j_max*h0);
                        let h2 = (-ad_sq + 2.0*j_max_sq*(tf_sq + t*(t - tf)) + (a0 + af)*j_max*tf - ad*h0 - 2.0*j_max*vd)/(h0*h0);
                        let orig = (-a0_p3 + af_p3 + 3.0*ad_sq*j_max*(h1 - t) + 3.0*ad*j_max_sq*(h1 - t)*(h1 - t) - 3.0*a0*af*ad + 3.0*j_max_sq*(a0*tf_sq - 2.0*pd + 2.0*tf*v0 + h1*h1*j_max*(tf - 2.0*t) + j_max*tf*(2.0*h1*t - t*t - (h1 - t)*tf)))/(6.0*j_max_sq);
                        let deriv = (h0*(-ad + j_max*tf)*(h2 - 1.0))/(2.0*j_max) + h1*(-ad + j_max*(tf - h1) - h0*h2);
                        t -= orig / deriv;
                    }
                    profile.t[0] = t;
                    profile.t[1] = 0.0;
                    profile.t[2] = (ad_sq + 2.0*j_max*(-a0*tf - ad*t + j_max*t*(t - tf) + vd))/(2.0*j_max*(-ad + j_max*(2.0*t - tf)));
                    profile.t[3] = ad/j_max + tf - 2.0*t;
                    profile.t[4] = tf - (t + profile.t[2] + profile.t[3]);
                    profile.t[5] = 0.0;
                    profile.t[6] = 0.0;
                    if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                        return true;
                    }
                }
            }
            {
                let h1 = 3.0*j_max*(ad_sq + 2.0*j_max*(a0*tf - vd));
                let h2 = ad_sq + 2.0*j_max*(a0*tf - vd);
                let h0 = (4.0*(2.0*(a0_p3 - af_p3) - 6.0*a0_sq*(af - j_max*tf) + 6.0*j_max_sq*g1 + 3.0*a0*(2.0*af_sq - 2.0*j_max*af*tf + j_max_sq*tf_sq) + 6.0*ad*j_max*vd).powi(2) - 18.0*h2*h2*h2).sqrt()/h1 * j_max.abs()/j_max;
                profile.t[0] = 0.0;
                profile.t[1] = 0.0;
                profile.t[2] = 0.0;
                profile.t[3] = (af_p3 - a0_p3 + 3.0*(af_sq - a0_sq)*j_max*tf - 3.0*ad*(a0*af + 2.0*j_max*vd) - 6.0*j_max_sq*g2)/h1;
                profile.t[4] = (tf - profile.t[3] - h0)/2.0 - ad/(2.0*j_max);
                profile.t[5] = h0;
                profile.t[6] = (tf - profile.t[3] + ad/j_max - h0)/2.0;
                if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                    return true;
                }
            }
            {
                let ph1 = ad_sq + 2.0*(af + a0)*j_max*tf - j_max*(j_max*tf_sq + 4.0*vd);
                let ph2 = j_max*tf_sq*g1 - vd*(-2.0*pd - tf*v0 + 3.0*tf*vf);
                let ph3 = 5.0*af_sq - 8.0*af*j_max*tf + 2.0*j_max*(2.0*j_max*tf_sq - vd);
                let ph4 = j_max_sq*tf_p4 - 2.0*vd_sq + 8.0*j_max*tf*(-pd + tf*vf);
                let ph5 = 5.0*af_p4 - 8.0*af_p3*j_max*tf - 12.0*af_sq*j_max*(j_max*tf_sq + vd) + 24.0*af*j_max_sq*(-2.0*pd + j_max*tf_p3 + 2.0*tf*vf) - 6.0*j_max_sq*ph4;
                let ph6 = -vd_sq + j_max*tf*(-2.0*pd + 3.0*tf*v0 - tf*vf) - af*g2;
                let mut polynom = [0.0; 4];
                polynom[0] = -(4.0*(a0_p3 - af_p3) - 12.0*a0_sq*(af - j_max*tf) + 6.0*a0*(2.0*af_sq - 2.0*af*j_max*tf + j_max*(j_max*tf_sq - 2.0*vd)) + 6.0*af*j_max*(3.0*j_max*tf_sq + 2.0*vd) - 6.0*j_max_sq*(-4.0*pd + j_max*tf_p3 - 2.0*tf*v0 + 6.0*tf*vf))/(3.0*j_max*ph1);
                polynom[1] = -(-a0_p4 - af_p4 + 4.0*a0_p3*(af - j_max*tf) + a0_sq*(-6.0*af_sq + 8.0*af*j_max*tf - 4.0*j_max*(j_max*tf_sq - vd)) + 2.0*af_sq*j_max*(j_max*tf_sq + 2.0*vd) - 4.0*af*j_max_sq*(-3.0*pd + j_max*tf_p3 + 2.0*tf*v0 + tf*vf) + j_max_sq*(j_max_sq*tf_p4 - 8.0*vd_sq + 4.0*j_max*tf*(-3.0*pd + tf*v0 + 2.0*tf*vf)) + 2.0*a0*(2.0*af_p3 - 2.0*af_sq*j_max*tf + af*j_max*(-3.0*j_max*tf_sq - 4.0*vd) + j_max_sq*(-6.0*pd + j_max*tf_p3 - 4.0*tf*v0 + 10.0*tf*vf)))/(j_max_sq*ph1);
                polynom[2] = -(a0_p5 - af_p5 + af_p4*j_max*tf - 5.0*a0_p4*(af - j_max*tf) + 2.0*a0_p3*ph3 + 4.0*af_p3*j_max*(j_max*tf_sq + vd) + 12.0*j_max_sq*af*ph6 - 2.0*a0_sq*(5.0*af_p3 - 9.0*af_sq*j_max*tf - 6.0*af*j_max*vd + 6.0*j_max_sq*(-2.0*pd - tf*v0 + 3.0*tf*vf)) - 12.0*j_max_sq*j_max*ph2 + a0*ph5)/(3.0*j_max_sq*j_max*ph1);
                polynom[3] = -(-a0_p6 - af_p6 + 6.0*a0_p5*(af - j_max*tf) - 48.0*af_p3*j_max_sq*g1 + 72.0*j_max_sq*j_max*(j_max*g1*g1 + vd_sq*vd + 2.0*af*g1*vd) - 3.0*a0_p4*ph3 - 36.0*af_sq*j_max_sq*vd_sq + 6.0*af_p4*j_max*vd + 4.0*a0_p3*(5.0*af_p3 - 9.0*af_sq*j_max*tf - 6.0*af*j_max*vd + 6.0*j_max_sq*(-2.0*pd - tf*v0 + 3.0*tf*vf)) - 3.0*a0_sq*ph5 + 6.0*a0*(af_p5 - af_p4*j_max*tf - 4.0*af_p3*j_max*(j_max*tf_sq + vd) + 12.0*j_max_sq*(-af*ph6 + j_max*ph2)))/(18.0*j_max_sq*j_max_sq*ph1);
                let t_max = (a0 - a_min)/j_max;
                let roots = positive_quart_monic(&polynom);
                for mut t in roots {
                    if t > t_max {
                        continue;
                    }
                    {
                        let h1 = ad_sq/2.0 + j_max*(af*t + (j_max*t - a0)*(t - tf) - vd);
                        let h2 = -ad + j_max*(tf - 2.0*t);
                        let h3 = h1.sqrt();
                        let orig = (af_p3 - a0_p3 + 3.0*af*j_max*t*(af + j_max*t) + 3.0*a0_sq*(af + j_max*t) - 3.0*a0*(af_sq + 2.0*af*j_max*t + j_max_sq*(t*t - tf_sq)) + 3.0*j_max_sq*(-2.0*pd + j_max*t*(t - tf)*tf + 2.0*tf*v0))/(6.0*j_max_sq) - h3*h3*h3/(j_max*j_max.abs()) + ((-ad - j_max*t)*h1)/(j_max_sq);
                        let deriv = (6.0*j_max*h2*h3/j_max.abs() + 2.0*(-ad - j_max*tf)*h2 - 2.0*(3.0*ad_sq + af*j_max*(8.0*t - 2.0*tf) + 4.0*a0*j_max*(-2.0*t + tf) + 2.0*j_max*(j_max*t*(3.0*t - 2.0*tf) - vd)))/(4.0*j_max);
                        t -= orig / deriv;
                    }
                    let h1 = (2.0*ad_sq + 4.0*j_max*(ad*t + a0*tf + j_max*t*(t - tf) - vd)).sqrt()/j_max.abs();
                    profile.t[0] = 0.0;
                    profile.t[1] = 0.0;
                    profile.t[2] = t;
                    profile.t[3] = tf - 2.0*t - ad/j_max - h1;
                    profile.t[4] = h1/2.0;
                    profile.t[5] = 0.0;
                    profile.t[6] = tf - (t + profile.t[3] + profile.t[4]);
                    if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                        return true;
                    }
                }
            }
        }
        {
            {
                let ph0 = -2.0*pd - tf*v0 + 3.0*tf*vf;
                let ph1 = -ad + j_max*tf;
                let ph2 = j_max*tf_sq*g1 - vd*ph0;
                let ph3 = 5.0*af_sq + 2.0*j_max*(2.0*j_max*tf_sq - vd - 4.0*af*tf);
                let ph4 = j_max_sq*tf_p4 - 2.0*vd_sq + 8.0*j_max*tf*(-pd + tf*vf);
                let ph5 = 5.0*af_p4 - 8.0*af_p3*j_max*tf - 12.0*af_sq*j_max*(j_max*tf_sq + vd) + 24.0*af*j_max_sq*(-2.0*pd + j_max*tf_p3 + 2.0*tf*vf) - 6.0*j_max_sq*ph4;
                let ph6 = -vd_sq + j_max*tf*(-2.0*pd + 3.0*tf*v0 - tf*vf);
                let ph7 = 3.0*j_max_sq*ph1*ph1;
                let mut polynom = [0.0; 4];
                polynom[0] = (4.0*af*tf - 2.0*j_max*tf_sq - 4.0*vd)/ph1;
                polynom[1] = (-2.0*(a0_p4 + af_p4) + 8.0*af_p3*j_max*tf + 6.0*af_sq*j_max_sq*tf_sq + 8.0*a0_p3*(af - j_max*tf) - 12.0*a0_sq*(af - j_max*tf)*(af - j_max*tf) - 12.0*af*j_max_sq*(-pd + j_max*tf_p3 - 2.0*tf*v0 + 3.0*tf*vf) + 2.0*a0*(4.0*af_p3 - 12.0*af_sq*j_max*tf + 9.0*af*j_max_sq*tf_sq - 3.0*j_max_sq*(2.0*pd + j_max*tf_p3 - 2.0*tf*vf)) + 3.0*j_max_sq*(j_max_sq*tf_p4 + 4.0*vd_sq - 4.0*j_max*tf*(pd + tf*v0 - 2.0*tf*vf)))/ph7;
                polynom[2] = (-a0_p5 + af_p5 - af_p4*j_max*tf + 5.0*a0_p4*(af - j_max*tf) - 2.0*a0_p3*ph3 - 4.0*af_p3*j_max*(j_max*tf_sq + vd) + 12.0*af_sq*j_max_sq*g2 - 12.0*af*j_max_sq*ph6 + 2.0*a0_sq*(5.0*af_p3 - 9.0*af_sq*j_max*tf - 6.0*af*j_max*vd + 6.0*j_max_sq*ph0) + 12.0*j_max_sq*j_max*ph2 + a0*(-5.0*af_p4 + 8.0*af_p3*j_max*tf + 12.0*af_sq*j_max*(j_max*tf_sq + vd) - 24.0*af*j_max_sq*(-2.0*pd + j_max*tf_p3 + 2.0*tf*vf) + 6.0*j_max_sq*ph4))/(j_max*ph7);
                polynom[3] = -(a0_p6 + af_p6 - 6.0*a0_p5*(af - j_max*tf) + 48.0*af_p3*j_max_sq*g1 - 72.0*j_max_sq*j_max*(j_max*g1*g1 + vd_sq*vd + 2.0*af*g1*vd) + 3.0*a0_p4*ph3 - 6.0*af_p4*j_max*vd + 36.0*af_sq*j_max_sq*vd_sq - 4.0*a0_p3*(5.0*af_p3 - 9.0*af_sq*j_max*tf - 6.0*af*j_max*vd + 6.0*j_max_sq*ph0) + 3.0*a0_sq*ph5 - 6.0*a0*(af_p5 - af_p4*j_max*tf - 4.0*af_p3*j_max*(j_max*tf_sq + vd) + 12.0*j_max_sq*(af_sq*g2 - af*ph6 + j_max*ph2)))/(6.0*j_max_sq*ph7);
                let roots = positive_quart_monic(&polynom);
                for t in roots {
                    if t > tf || t > (a_max - a0)/j_max {
                        continue;
                    }
                    let h1 = (ad_sq/(2.0*j_max_sq) + (a0*(t + tf) - af*t + j_max*t*tf - vd)/j_max).sqrt();
                    profile.t[0] = t;
                    profile.t[1] = tf - ad/j_max - 2.0*h1;
                    profile.t[2] = h1;
                    profile.t[3] = 0.0;
                    profile.t[4] = ad/j_max + h1 - t;
                    profile.t[5] = 0.0;
                    profile.t[6] = 0.0;
                    if profile.check(JerkSigns::Udud, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                        return true;
                    }
                }
            }
        }
        if (af - a0).abs() < f64::EPSILON {
            let h1 = (4.0*(a0*tf - vd)/j_max + tf_sq).sqrt();
            profile.t[0] = (tf - h1)/2.0;
            profile.t[1] = h1;
            profile.t[2] = profile.t[0];
            profile.t[3] = 0.0;
            profile.t[4] = 0.0;
            profile.t[5] = 0.0;
            profile.t[6] = 0.0;
            if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        {
            let mut polynom = [0.0; 4];
            polynom[0] = ad_sq;
            polynom[1] = ad_sq*tf;
            polynom[2] = (a0_sq + af_sq + 10.0*a0*af)*tf_sq + 24.0*(tf*(af*v0 - a0*vf) - pd*ad) + 12.0*vd_sq;
            polynom[3] = -3.0*tf*((a0_sq + af_sq + 2.0*a0*af)*tf_sq - 4.0*vd*(a0 + af)*tf + 4.0*vd_sq);
            let roots = positive_cubic(polynom[0], polynom[1], polynom[2], polynom[3]);
            for t in roots {
                if t > tf {
                    continue;
                }
                let jf = ad/(tf - t);
                profile.t[0] = (2.0*(vd - a0*tf) + ad*(t - tf))/(2.0*jf*t);
                profile.t[1] = t;
                profile.t[2] = 0.0;
                profile.t[3] = 0.0;
                profile.t[4] = 0.0;
                profile.t[5] = 0.0;
                profile.t[6] = tf - (profile.t[0] + profile.t[1]);
                if profile.check_with_jerk_limit(JerkSigns::Uddu, ReachedLimits::None, jf, v_max, v_min, a_max, a_min, j_max) {
                    return true;
                }
            }
        }
        {
            profile.t[0] = (ad_sq/j_max + 2.0*(a0 + af)*tf - j_max*tf_sq - 4.0*vd)/(4.0*(ad - j_max*tf));
            profile.t[1] = 0.0;
            profile.t[2] = -ad/(2.0*j_max) + tf/2.0;
            profile.t[3] = 0.0;
            profile.t[4] = 0.0;
            profile.t[5] = 0.0;
            profile.t[6] = tf - (profile.t[0] + profile.t[2]);
            if profile.check(JerkSigns::Uddu, ReachedLimits::None, j_max, v_max, v_min, a_max, a_min) {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synchronize(tf: f64, p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) -> Option<Profile> {
        let step = PositionStep2::new(tf, p0, v0, a0, pf, vf, af, 1.0, -1.0, 1.0, -1.0, 1.0);
        let mut profile = Profile::new(p0, v0, a0, pf, vf, af);
        step.get_profile(&mut profile).then_some(profile)
    }

    fn assert_reaches(profile: &Profile, tf: f64, pf: f64, vf: f64, af: f64) {
        assert!((profile.duration() - tf).abs() < 1e-8, "duration {}", profile.duration());
        let (p, v, a, _) = profile.state_at(tf);
        assert!((p - pf).abs() < 1e-8 && (v - vf).abs() < 1e-8 && (a - af).abs() < 1e-10);
    }

    #[test]
    fn stretches_rest_to_rest_motion() {
        let profile = synchronize(4.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0).expect("profile");
        assert_reaches(&profile, 4.0, 1.0, 0.0, 0.0);
    }

    #[test]
    fn stretches_motion_with_final_velocity() {
        let profile = synchronize(4.0, -2.0, 0.0, 0.0, -3.0, 0.3, 0.0).expect("profile");
        assert_reaches(&profile, 4.0, -3.0, 0.3, 0.0);
        // The limiting DOF of this move reaches 0.5 after 2 s
        let (p, _, _, _) = profile.state_at(2.0);
        assert!((p + 2.6871268303).abs() < 1e-8);
    }

    #[test]
    fn long_duration_with_initial_motion() {
        let profile = synchronize(12.0, 0.0, 0.4, -0.2, 2.0, 0.0, 0.0).expect("profile");
        assert_reaches(&profile, 12.0, 2.0, 0.0, 0.0);
    }

    #[test]
    fn too_short_duration_fails() {
        assert!(synchronize(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0).is_none());
    }
}
