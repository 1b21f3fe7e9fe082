//! Scoring functions over pretrained embedding rows.
//!
//! All functions take equal-length rows and return a plausibility score
//! where higher is better; distance-based models negate their distance.

/// TransE scoring: -||h + r - t||_2
pub fn score_transe(head: &[f32], relation: &[f32], tail: &[f32]) -> f32 {
    let mut sum_sq = 0.0;
    for i in 0..head.len() {
        let diff = head[i] + relation[i] - tail[i];
        sum_sq += diff * diff;
    }
    -sum_sq.sqrt()
}

/// DistMult scoring: <h, r, t>
pub fn score_distmult(head: &[f32], relation: &[f32], tail: &[f32]) -> f32 {
    let mut score = 0.0;
    for i in 0..head.len() {
        score += head[i] * relation[i] * tail[i];
    }
    score
}

/// ComplEx scoring: Re(<h, r, conj(t)>).
/// Row length must be even (real, imag interleaved).
pub fn score_complex(head: &[f32], relation: &[f32], tail: &[f32]) -> f32 {
    let dim = head.len() / 2;
    let mut score = 0.0;

    for i in 0..dim {
        let h_re = head[2 * i];
        let h_im = head[2 * i + 1];
        let r_re = relation[2 * i];
        let r_im = relation[2 * i + 1];
        let t_re = tail[2 * i];
        let t_im = tail[2 * i + 1];

        // <h, r, conj(t)>: with (h*r) = X + Yi, the real part of
        // (X+Yi)(t_re - t_im i) is X*t_re + Y*t_im.
        let x = h_re * r_re - h_im * r_im;
        let y = h_re * r_im + h_im * r_re;

        score += x * t_re + y * t_im;
    }
    score
}

/// SimplE scoring: ½(<h_head, r, t_tail> + <t_head, r_inv, h_tail>).
///
/// Each entity row is its head half followed by its tail half; each relation
/// row is the forward relation followed by its inverse. Row length must be
/// even.
pub fn score_simple(head: &[f32], relation: &[f32], tail: &[f32]) -> f32 {
    let dim = head.len() / 2;
    let (h_head, h_tail) = head.split_at(dim);
    let (t_head, t_tail) = tail.split_at(dim);
    let (r_fwd, r_inv) = relation.split_at(dim);

    let mut forward = 0.0;
    let mut inverse = 0.0;
    for i in 0..dim {
        forward += h_head[i] * r_fwd[i] * t_tail[i];
        inverse += t_head[i] * r_inv[i] * h_tail[i];
    }
    0.5 * (forward + inverse)
}
