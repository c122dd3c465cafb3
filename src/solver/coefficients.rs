//! Finite-difference weights of the tensioned biharmonic stencil.
//!
//! `unconstrained[k]` already includes the `1 / a0` normalisation of the
//! central term; `constrained[k]` is left unnormalised because nodes near a
//! datum divide by a point-specific factor (Briggs `b[4]`).
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StencilCoefficients {
    pub unconstrained: [f64; 12],
    pub constrained: [f64; 12],
    pub a0_const_1: f64,
    pub a0_const_2: f64,
    /// ε².
    pub eps_p2: f64,
    /// 1 / ε².
    pub eps_m2: f64,
    pub one_plus_e2: f64,
    pub two_plus_ep2: f64,
    pub two_plus_em2: f64,
    /// 2ε², the form used by the Briggs coefficients.
    pub briggs_e2: f64,
}

impl StencilCoefficients {
    /// Weights for interior tension `tension` and aspect ratio `epsilon`.
    pub fn new(tension: f64, epsilon: f64) -> Self {
        let loose = 1.0 - tension;
        let e2 = epsilon * epsilon;
        let e4 = e2 * e2;
        let one_plus_e2 = 1.0 + e2;
        let a0 = 1.0
            / ((6.0 * e4 * loose + 10.0 * e2 * loose + 8.0 * loose - 2.0 * one_plus_e2)
                + 4.0 * tension * one_plus_e2);

        let mut constrained = [0.0; 12];
        constrained[4] = -loose;
        constrained[7] = -loose;
        constrained[0] = -loose * e4;
        constrained[11] = -loose * e4;
        constrained[5] = 2.0 * loose * one_plus_e2;
        constrained[6] = constrained[5];
        constrained[2] = constrained[5] * e2;
        constrained[9] = constrained[2];
        for k in [1, 3, 8, 10] {
            constrained[k] = -2.0 * loose * e2;
        }

        let mut unconstrained = [0.0; 12];
        unconstrained[4] = -loose * a0;
        unconstrained[7] = unconstrained[4];
        unconstrained[0] = -loose * e4 * a0;
        unconstrained[11] = unconstrained[0];
        unconstrained[5] = (2.0 * constrained[5] + tension) * a0;
        unconstrained[6] = unconstrained[5];
        unconstrained[2] = unconstrained[5] * e2;
        unconstrained[9] = unconstrained[2];
        for k in [1, 3, 8, 10] {
            unconstrained[k] = constrained[1] * a0;
        }

        Self {
            unconstrained,
            constrained,
            a0_const_1: 2.0 * loose * (1.0 + e4),
            a0_const_2: 2.0 - tension + 2.0 * loose * e2,
            eps_p2: e2,
            eps_m2: 1.0 / e2,
            one_plus_e2,
            two_plus_ep2: 2.0 + 2.0 * e2,
            two_plus_em2: 2.0 + 2.0 / e2,
            briggs_e2: 2.0 * e2,
        }
    }
}
