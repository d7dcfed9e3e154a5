use std::ops::Neg;

/// Number of bits needed to represent `x`, that is `ceil(log2(x + 1))`.
#[inline(always)]
pub fn ceil_log1p(x: u64) -> usize {
    (u64::BITS - x.leading_zeros()) as usize
}

/// Shannon entropy, in bits per symbol, of a frequency table summing to `total_freq`.
pub fn entropy(distr: &[u16], total_freq: f64) -> f64 {
    let mut entropy = 0.0;

    for &freq in distr {
        if freq == 0 {
            continue;
        }
        let pr = freq as f64 / total_freq;
        entropy += pr * f64::log2(pr);
    }
    entropy.neg()
}
