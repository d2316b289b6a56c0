use crate::errors::ReconstructionError;
use crate::fr::Fr;

/// Multiplies a coefficient vector (index = power of `x`) by the linear factor `(x - root)`.
fn mul_linear_factor(poly: &[Fr], root: Fr) -> Vec<Fr> {
    let mut out = vec![Fr::ZERO; poly.len() + 1];
    for (i, &c) in poly.iter().enumerate() {
        out[i + 1] = out[i + 1].add(c);
        out[i] = out[i].sub(c.mul(root));
    }
    out
}

/// Lagrange interpolation, converted to monomial-basis coefficients: the unique polynomial of
/// degree `< degree` passing through the first `degree` of the given `(xs[i], ys[i])` pairs
/// (§4.6). `O(degree^2)` field multiplications, fine at `degree = ReconstructionThreshold`.
pub fn reconstruct_polynomial(
    xs: &[Fr],
    ys: &[Fr],
    degree: usize,
) -> Result<Vec<Fr>, ReconstructionError> {
    if xs.len() != ys.len() {
        return Err(ReconstructionError::LengthMismatch);
    }
    if xs.len() < degree {
        return Err(ReconstructionError::InsufficientPoints);
    }
    let xs = &xs[..degree];
    let ys = &ys[..degree];

    let mut coeffs = vec![Fr::ZERO; degree];
    for i in 0..degree {
        let mut numerator = vec![Fr::ONE];
        let mut denom = Fr::ONE;
        for j in 0..degree {
            if i == j {
                continue;
            }
            let diff = xs[i].sub(xs[j]);
            if diff.is_zero() {
                return Err(ReconstructionError::DuplicateEvaluationPoint);
            }
            denom = denom.mul(diff);
            numerator = mul_linear_factor(&numerator, xs[j]);
        }
        let scale = ys[i].mul(denom.inv().expect("checked non-zero above"));
        for (k, c) in numerator.into_iter().enumerate() {
            coeffs[k] = coeffs[k].add(c.mul(scale));
        }
    }
    Ok(coeffs)
}

/// Horner evaluation of a coefficient-form polynomial at `x`.
pub fn evaluate_polynomial(coeffs: &[Fr], x: Fr) -> Fr {
    let mut acc = Fr::ZERO;
    for c in coeffs.iter().rev() {
        acc = acc.mul(x).add(*c);
    }
    acc
}

fn fft_recursive(values: &[Fr], root: Fr) -> Vec<Fr> {
    let n = values.len();
    if n == 1 {
        return vec![values[0]];
    }
    let even: Vec<Fr> = values.iter().step_by(2).copied().collect();
    let odd: Vec<Fr> = values.iter().skip(1).step_by(2).copied().collect();
    let root_sq = root.mul(root);
    let fe = fft_recursive(&even, root_sq);
    let fo = fft_recursive(&odd, root_sq);

    let mut out = vec![Fr::ZERO; n];
    let mut w = Fr::ONE;
    for i in 0..n / 2 {
        let t = w.mul(fo[i]);
        out[i] = fe[i].add(t);
        out[i + n / 2] = fe[i].sub(t);
        w = w.mul(root);
    }
    out
}

fn check_power_of_two(n: usize) -> Result<u32, ReconstructionError> {
    if n == 0 || !n.is_power_of_two() {
        Err(ReconstructionError::NotPowerOfTwo)
    } else {
        Ok(n.trailing_zeros())
    }
}

/// Radix-2 DIT FFT over `Fr`, rooted at a primitive `n`-th root of unity. `n` must be a power of
/// two (§4.6).
pub fn fft(values: &[Fr]) -> Result<Vec<Fr>, ReconstructionError> {
    let log_n = check_power_of_two(values.len())?;
    let root = Fr::primitive_root_of_unity(log_n);
    Ok(fft_recursive(values, root))
}

/// Inverse of [`fft`]: `inverse_fft(fft(v)) == v`.
pub fn inverse_fft(values: &[Fr]) -> Result<Vec<Fr>, ReconstructionError> {
    let log_n = check_power_of_two(values.len())?;
    let root = Fr::primitive_root_of_unity(log_n)
        .inv()
        .expect("roots of unity are never zero");
    let transformed = fft_recursive(values, root);
    let n_inv = Fr::from_u64(values.len() as u64)
        .inv()
        .expect("power-of-two lengths are never zero mod r");
    Ok(transformed.into_iter().map(|v| v.mul(n_inv)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_a_known_linear_polynomial() {
        // y = 3x + 5
        let xs = vec![Fr::from_u64(0), Fr::from_u64(1), Fr::from_u64(2)];
        let ys: Vec<Fr> = xs.iter().map(|&x| x.mul(Fr::from_u64(3)).add(Fr::from_u64(5))).collect();
        let coeffs = reconstruct_polynomial(&xs, &ys, 2).unwrap();
        assert_eq!(coeffs.len(), 2);
        assert_eq!(coeffs[0], Fr::from_u64(5));
        assert_eq!(coeffs[1], Fr::from_u64(3));
    }

    #[test]
    fn evaluate_matches_the_interpolated_points() {
        let xs = vec![Fr::from_u64(1), Fr::from_u64(2), Fr::from_u64(3)];
        let ys = vec![Fr::from_u64(10), Fr::from_u64(20), Fr::from_u64(40)];
        let coeffs = reconstruct_polynomial(&xs, &ys, 3).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert_eq!(evaluate_polynomial(&coeffs, *x), *y);
        }
    }

    #[test]
    fn rejects_mismatched_lengths_and_insufficient_points() {
        let xs = vec![Fr::from_u64(1), Fr::from_u64(2)];
        let ys = vec![Fr::from_u64(1)];
        assert_eq!(
            reconstruct_polynomial(&xs, &ys, 2),
            Err(ReconstructionError::LengthMismatch)
        );
        let ys2 = vec![Fr::from_u64(1), Fr::from_u64(2)];
        assert_eq!(
            reconstruct_polynomial(&xs, &ys2, 5),
            Err(ReconstructionError::InsufficientPoints)
        );
    }

    #[test]
    fn fft_and_inverse_fft_round_trip() {
        let values: Vec<Fr> = (0..8).map(Fr::from_u64).collect();
        let transformed = fft(&values).unwrap();
        let recovered = inverse_fft(&transformed).unwrap();
        assert_eq!(recovered, values);
    }

    #[test]
    fn fft_rejects_non_power_of_two_lengths() {
        let values: Vec<Fr> = (0..6).map(Fr::from_u64).collect();
        assert_eq!(fft(&values), Err(ReconstructionError::NotPowerOfTwo));
    }
}
