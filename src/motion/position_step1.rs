// src/motion/position_step1.rs - Extremal profiles of a single position-controlled DOF
//
// Step 1 enumerates every profile shape (which limits are reached, which way
// the motion heads) that brings the DOF from its start to its target. The
// fastest one gives the minimal duration; slower valid ones bound the blocked
// duration intervals.

use super::profile::{JerkSigns, Profile, ReachedLimits};
use super::roots::{polish, solve_quartic_scaled};

const EPS: f64 = f64::EPSILON;

/// Limits in one heading. The "down" heading swaps and negates them.
#[derive(Debug, Clone, Copy)]
struct Heading {
    v_max: f64,
    v_min: f64,
    a_max: f64,
    a_min: f64,
    j: f64,
}

impl Heading {
    fn flipped(self) -> Self {
        Self { v_max: self.v_min, v_min: self.v_max, a_max: self.a_min, a_min: self.a_max, j: -self.j }
    }
}

#[derive(Debug, Clone)]
pub struct PositionStep1 {
    v0: f64,
    a0: f64,
    vf: f64,
    af: f64,
    pd: f64,
    vd: f64,
    up: Heading,
    scale: f64,
}

impl PositionStep1 {
    /// Creates the solver for a DOF whose (already braked) start state is
    /// `(p0, v0, a0)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
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
        let scale = a0
            .abs()
            .max(af.abs())
            .max((j_max.abs() * v0.abs().max(vf.abs())).sqrt())
            .max((j_max * j_max * pd).abs().cbrt())
            .max(1e-12);
        Self {
            v0,
            a0,
            vf,
            af,
            pd,
            vd: vf - v0,
            up: Heading { v_max, v_min, a_max, a_min, j: j_max },
            scale,
        }
    }

    /// Pushes every valid extremal profile into `found`, each cloned from
    /// `template` (which carries the start state, target and brake). Returns
    /// whether the target is a rest state, in which case only the fastest
    /// profile is kept and no duration above it is blocked.
    pub fn get_profiles(&self, template: &Profile, found: &mut Vec<Profile>) -> bool {
        found.clear();
        let up = self.up;
        let down = up.flipped();

        if self.pd.abs() < EPS
            && self.vd.abs() < EPS
            && (self.af - self.a0).abs() < EPS
            && self.v0.abs() < EPS
            && self.a0.abs() < EPS
        {
            let mut profile = *template;
            profile.t = [0.0; 7];
            profile.check(JerkSigns::Uddu, ReachedLimits::None, up.j, up.v_max, up.v_min, up.a_max, up.a_min);
            found.push(profile);
            return true;
        }

        if self.vf.abs() < EPS && self.af.abs() < EPS {
            let order = if self.pd >= 0.0 { [up, down] } else { [down, up] };
            for h in order {
                self.time_all_vel(template, h, found);
                if self.keep_fastest(found) {
                    return true;
                }
                self.time_all_none_acc0_acc1(template, h, found);
                if self.keep_fastest(found) {
                    return true;
                }
                self.time_acc0_acc1(template, h, found);
                if self.keep_fastest(found) {
                    return true;
                }
            }
            return true;
        }

        for h in [up, down] {
            self.time_all_none_acc0_acc1(template, h, found);
            self.time_acc0_acc1(template, h, found);
            self.time_all_vel(template, h, found);
        }
        false
    }

    fn keep_fastest(&self, found: &mut Vec<Profile>) -> bool {
        let Some(best) = found.iter().copied().min_by(|a, b| a.duration().total_cmp(&b.duration())) else {
            return false;
        };
        found.clear();
        found.push(best);
        true
    }

    /// Durations of a profile with acceleration plateaus at `a1` (length `t1`)
    /// and `a2` (length `t5`) and no cruise. The merged jerk arc from `a1` to
    /// `a2` is split where the acceleration crosses zero.
    fn fill(&self, profile: &mut Profile, a1: f64, t1: f64, a2: f64, t5: f64, j: f64) {
        let t_merged = (a1 - a2) / j;
        let t2 = (a1 / j).max(0.0).min(t_merged);
        profile.t = [(a1 - self.a0) / j, t1, t2, 0.0, t_merged - t2, t5, (self.af - a2) / j];
    }

    fn time_all_vel(&self, template: &Profile, h: Heading, found: &mut Vec<Profile>) {
        let Heading { v_max, a_max, a_min, j, .. } = h;
        let (v0, a0, vf, af) = (self.v0, self.a0, self.vf, self.af);
        if v_max.abs() < EPS {
            return;
        }

        // Accelerate from (v0, a0) to (v_max, 0)
        let h0 = a0 * a0 / 2.0 + j * (v_max - v0);
        if h0 < 0.0 {
            return;
        }
        let mut a_peak = h0.sqrt().copysign(j);
        let mut t1 = 0.0;
        if a_peak.abs() > a_max.abs() {
            a_peak = a_max;
            t1 = (v_max - v0 - (2.0 * a_peak * a_peak - a0 * a0) / (2.0 * j)) / a_peak;
        }

        // Decelerate from (v_max, 0) to (vf, af)
        let h1 = af * af / 2.0 + j * (v_max - vf);
        if h1 < 0.0 {
            return;
        }
        let mut a_low = -h1.sqrt().copysign(j);
        let mut t5 = 0.0;
        if a_low.abs() > a_min.abs() {
            a_low = a_min;
            t5 = (vf - v_max - (af * af - 2.0 * a_low * a_low) / (2.0 * j)) / a_low;
        }

        let mut profile = *template;
        profile.t = [(a_peak - a0) / j, t1, a_peak / j, 0.0, -a_low / j, t5, (af - a_low) / j];

        // Distance covered without cruising
        let jerks = [j, 0.0, -j, 0.0, -j, 0.0, j];
        let (mut p, mut v, mut a) = (0.0, v0, a0);
        for i in (0..7).filter(|&i| i != 3) {
            let (t, jj) = (profile.t[i], jerks[i]);
            p += t * (v + t * (a / 2.0 + t * jj / 6.0));
            v += t * (a + t * jj / 2.0);
            a += t * jj;
            if i == 2 {
                a = 0.0;
            }
        }
        profile.t[3] = (self.pd - p) / v_max;

        let limits = match (t1 > 0.0, t5 > 0.0) {
            (true, true) => ReachedLimits::Acc0Acc1Vel,
            (true, false) => ReachedLimits::Acc0Vel,
            (false, true) => ReachedLimits::Acc1Vel,
            (false, false) => ReachedLimits::Vel,
        };
        if profile.check(JerkSigns::Uddu, limits, j, h.v_max, h.v_min, h.a_max, h.a_min) {
            found.push(profile);
        }
    }

    fn time_acc0_acc1(&self, template: &Profile, h: Heading, found: &mut Vec<Profile>) {
        let (v0, a0, vf, af, pd) = (self.v0, self.a0, self.vf, self.af, self.pd);
        let (a_hi, a_lo, j) = (h.a_max, h.a_min, h.j);
        let (a0_2, af_2, hi_2, lo_2, j_2) = (a0 * a0, af * af, a_hi * a_hi, a_lo * a_lo, j * j);

        let q2 = -a_lo * j_2 * (a_hi - a_lo) / 2.0;
        let q1 = j * (a_hi - a_lo) * (-a_hi * a_lo + 2.0 * lo_2 - af_2 + 2.0 * j * vf) / 2.0;
        let q0 = -(3.0 * a0_2 * a0_2 - 8.0 * a0_2 * a0 * a_hi + 6.0 * a0_2 * hi_2 - 12.0 * a0_2 * j * v0
            + 24.0 * a0 * a_hi * j * v0
            - 12.0 * hi_2 * lo_2
            + 6.0 * hi_2 * af_2
            - 12.0 * hi_2 * j * v0
            - 12.0 * hi_2 * j * vf
            + 24.0 * a_hi * lo_2 * a_lo
            - 24.0 * a_hi * a_lo * af_2
            + 48.0 * a_hi * a_lo * j * vf
            + 8.0 * a_hi * af_2 * af
            - 24.0 * a_hi * af * j * vf
            + 24.0 * a_hi * j_2 * pd
            - 12.0 * lo_2 * lo_2
            + 12.0 * lo_2 * af_2
            - 24.0 * lo_2 * j * vf
            - 3.0 * af_2 * af_2
            + 12.0 * af_2 * j * vf
            + 12.0 * j_2 * v0 * v0
            - 12.0 * j_2 * vf * vf)
            / 24.0;

        if q2.abs() < EPS {
            return;
        }
        let disc = q1 * q1 - 4.0 * q2 * q0;
        if disc < 0.0 {
            return;
        }

        let sq = disc.sqrt();
        for t5 in [(-q1 + sq) / (2.0 * q2), (-q1 - sq) / (2.0 * q2)] {
            let t1 = (a0_2 - 2.0 * hi_2 + 2.0 * lo_2 - 2.0 * a_lo * j * t5 - af_2 - 2.0 * j * v0 + 2.0 * j * vf)
                / (2.0 * a_hi * j);
            let mut profile = *template;
            self.fill(&mut profile, a_hi, t1, a_lo, t5, j);
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc0Acc1, j, h.v_max, h.v_min, h.a_max, h.a_min) {
                found.push(profile);
            }
        }
    }

    fn time_all_none_acc0_acc1(&self, template: &Profile, h: Heading, found: &mut Vec<Profile>) {
        let (v0, a0, vf, af, pd, vd) = (self.v0, self.a0, self.vf, self.af, self.pd, self.vd);
        let j = h.j;
        let (a0_2, af_2, j_2) = (a0 * a0, af * af, j * j);
        let (a0_3, af_3) = (a0_2 * a0, af_2 * af);
        let (a0_4, af_4) = (a0_2 * a0_2, af_2 * af_2);

        // No limit reached: quartic in the first peak acceleration a1
        let u = (af_2 - a0_2) / 2.0 + j * (v0 - vf);
        let x = af_3 - a0_3 + 3.0 * j * (a0 * v0 - af * vf) + 3.0 * j_2 * pd;
        let w = 2.0 * j * v0 - a0_2;
        let g = a0_2 + af_2 - 2.0 * j * (v0 + vf);
        let coeffs = [u, -2.0 * x / 3.0, u * u, -2.0 * x * w / 3.0, x * x / 9.0 - u * g * g / 4.0];
        for a1 in solve_quartic_scaled(&coeffs, self.scale) {
            let a1 = polish(&coeffs, a1, 8);
            let mut s = a1 * a1 + (af_2 - a0_2) / 2.0 - j * vd;
            if s < 0.0 {
                if s > -1e-12 {
                    s = 0.0;
                } else {
                    continue;
                }
            }

            let d = (a0_2 + af_2 - 2.0 * j * (v0 + vf) - 2.0 * a1 * a1) / (2.0 * j_2);
            let root = s.sqrt();
            let candidates = if d.abs() > 1e-12 {
                let c = (3.0 * a1 * a1 * a1 - 3.0 * a0_2 * a1 + 6.0 * j * v0 * a1 + a0_3 - 3.0 * a0 * j * v0 - af_3
                    + 3.0 * af * j * vf
                    - 3.0 * j_2 * pd)
                    / (3.0 * j_2);
                [Some(root.copysign(-c / d)), None]
            } else {
                [Some(root), Some(-root)]
            };

            for a2 in candidates.into_iter().flatten() {
                let mut profile = *template;
                self.fill(&mut profile, a1, 0.0, a2, 0.0, j);
                if profile.check(JerkSigns::Uddu, ReachedLimits::None, j, h.v_max, h.v_min, h.a_max, h.a_min) {
                    found.push(profile);
                }
            }
        }

        // First acceleration limit reached: quartic in a2
        let a_hi = h.a_max;
        let hi_2 = a_hi * a_hi;
        let e0 = -(3.0 * a0_4 - 8.0 * a0_3 * a_hi + 6.0 * a0_2 * hi_2 - 12.0 * a0_2 * j * v0
            + 24.0 * a0 * a_hi * j * v0
            + 6.0 * hi_2 * af_2
            - 12.0 * hi_2 * j * v0
            - 12.0 * hi_2 * j * vf
            + 8.0 * a_hi * af_3
            - 24.0 * a_hi * af * j * vf
            + 24.0 * a_hi * j_2 * pd
            - 3.0 * af_4
            + 12.0 * af_2 * j * vf
            + 12.0 * j_2 * v0 * v0
            - 12.0 * j_2 * vf * vf)
            / 12.0;
        let coeffs = [1.0, -2.0 * a_hi, hi_2 - af_2 + 2.0 * j * vf, -2.0 * a_hi * (2.0 * j * vf - af_2), e0];
        for a2 in solve_quartic_scaled(&coeffs, self.scale) {
            let a2 = polish(&coeffs, a2, 8);
            let t1 = (a0_2 - 2.0 * hi_2 + 2.0 * a2 * a2 - af_2 - 2.0 * j * v0 + 2.0 * j * vf) / (2.0 * a_hi * j);
            let mut profile = *template;
            self.fill(&mut profile, a_hi, t1, a2, 0.0, j);
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc0, j, h.v_max, h.v_min, h.a_max, h.a_min) {
                found.push(profile);
            }
        }

        // Second acceleration limit reached: quartic in a1
        let a_lo = h.a_min;
        let lo_2 = a_lo * a_lo;
        let e0 = (3.0 * a0_4 - 8.0 * a0_3 * a_lo - 6.0 * a0_2 * lo_2 - 12.0 * a0_2 * j * v0
            + 24.0 * a0 * a_lo * j * v0
            - 6.0 * lo_2 * af_2
            + 12.0 * lo_2 * j * v0
            + 12.0 * lo_2 * j * vf
            + 8.0 * a_lo * af_3
            - 24.0 * a_lo * af * j * vf
            + 24.0 * a_lo * j_2 * pd
            - 3.0 * af_4
            + 12.0 * af_2 * j * vf
            + 12.0 * j_2 * v0 * v0
            - 12.0 * j_2 * vf * vf)
            / 12.0;
        let coeffs = [1.0, -2.0 * a_lo, lo_2 - a0_2 + 2.0 * j * v0, -2.0 * a_lo * (2.0 * j * v0 - a0_2), e0];
        for a1 in solve_quartic_scaled(&coeffs, self.scale) {
            let a1 = polish(&coeffs, a1, 8);
            let t5 = (a0_2 - 2.0 * a1 * a1 + 2.0 * lo_2 - af_2 - 2.0 * j * v0 + 2.0 * j * vf) / (2.0 * a_lo * j);
            let mut profile = *template;
            self.fill(&mut profile, a1, 0.0, a_lo, t5, j);
            if profile.check(JerkSigns::Uddu, ReachedLimits::Acc1, j, h.v_max, h.v_min, h.a_max, h.a_min) {
                found.push(profile);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(p0: f64, v0: f64, a0: f64, pf: f64, vf: f64, af: f64) -> (Vec<Profile>, bool) {
        let step = PositionStep1::new(p0, v0, a0, pf, vf, af, 1.0, -1.0, 1.0, -1.0, 1.0);
        let template = Profile::new(p0, v0, a0, pf, vf, af);
        let mut found = Vec::new();
        let zero_final = step.get_profiles(&template, &mut found);
        (found, zero_final)
    }

    #[test]
    fn rest_to_rest_minimum() {
        let (found, zero_final) = solve(0.0, 0.0, 0.0, 1.0, 0.0, 0.0);
        assert!(zero_final);
        assert_eq!(found.len(), 1);
        assert!((found[0].duration() - 3.1748021039).abs() < 1e-8);
    }

    #[test]
    fn long_move_cruises_at_max_velocity() {
        let (found, _) = solve(0.0, 0.0, 0.0, 3.0, 0.0, 0.0);
        assert_eq!(found[0].limits, ReachedLimits::Vel);
        assert!((found[0].duration() - 5.0).abs() < 1e-8);
    }

    #[test]
    fn moving_target_yields_all_candidates() {
        let (found, zero_final) = solve(-2.0, 0.0, 0.0, -3.0, 0.3, 0.0);
        assert!(!zero_final);
        let fastest = found.iter().map(Profile::duration).fold(f64::INFINITY, f64::min);
        assert!((fastest - 3.6860977315).abs() < 1e-8);
        for profile in &found {
            let (p, v, a, _) = profile.state_at(profile.duration());
            assert!((p + 3.0).abs() < 1e-8 && (v - 0.3).abs() < 1e-8 && a.abs() < 1e-10);
        }
    }

    #[test]
    fn identical_states_give_empty_profile() {
        let (found, zero_final) = solve(0.5, 0.0, 0.0, 0.5, 0.0, 0.0);
        assert!(zero_final);
        assert_eq!(found[0].duration(), 0.0);
    }
}
