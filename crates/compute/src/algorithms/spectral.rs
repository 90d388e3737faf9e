use std::f64::consts::PI;

use indexmap::IndexMap;
use rayon::prelude::*;
use spe_core::EmbeddingResult;
use tracing::debug;

/// Upper bound on the number of frequency bins returned.
pub const MAX_BINS: usize = 256;

/// Normalized magnitude spectrum of `x`.
///
/// Returns `K = min(256, N)` bins computed by a direct DFT,
/// `X[k] = Σ x[n]·e^(−2πikn/N)`, each divided by the largest magnitude so the
/// peak is 1.0. An all-zero spectrum is returned as `K` zeros and an empty
/// input yields an empty vector.
///
/// Cost is O(N·K).
pub fn magnitude_spectrum(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    let bins = n.min(MAX_BINS);
    let mags: Vec<f64> = (0..bins).map(|k| direct_bin(x, k)).collect();
    normalize(mags)
}

/// Same output as [`magnitude_spectrum`] up to rounding. Uses an iterative
/// radix-2 FFT when `N` is a power of two and the direct transform otherwise.
pub fn magnitude_spectrum_fast(x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 || !n.is_power_of_two() {
        return magnitude_spectrum(x);
    }

    let mut re = x.to_vec();
    let mut im = vec![0.0; n];
    fft_radix2(&mut re, &mut im);

    let bins = n.min(MAX_BINS);
    let mags: Vec<f64> = (0..bins).map(|k| re[k].hypot(im[k])).collect();
    normalize(mags)
}

/// Index of the first bin holding the largest value. NaN bins are ignored.
pub fn dominant_bin(spectrum: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in spectrum.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, max)) if v <= max => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Spectrum of every embedding component, computed in parallel.
///
/// Keys follow [`EmbeddingResult::component_names`]: `meta.order` first, then
/// any components it does not mention.
pub fn component_spectra(result: &EmbeddingResult) -> IndexMap<String, Vec<f64>> {
    let names = result.component_names();
    let spectra: Vec<(String, Vec<f64>)> = names
        .par_iter()
        .filter_map(|name| {
            result
                .component(name)
                .map(|values| (name.to_string(), magnitude_spectrum_fast(values)))
        })
        .collect();

    debug!(components = spectra.len(), "computed component spectra");
    spectra.into_iter().collect()
}

fn direct_bin(x: &[f64], k: usize) -> f64 {
    let n = x.len();
    let mut re = 0.0;
    let mut im = 0.0;
    for (i, &v) in x.iter().enumerate() {
        // k·i mod N keeps the angle small without changing its value.
        let angle = -2.0 * PI * ((k * i) % n) as f64 / n as f64;
        let (sin, cos) = angle.sin_cos();
        re += v * cos;
        im += v * sin;
    }
    (re * re + im * im).sqrt()
}

fn normalize(mut mags: Vec<f64>) -> Vec<f64> {
    let max = mags.iter().copied().fold(0.0_f64, f64::max);
    if max == 0.0 {
        mags.iter_mut().for_each(|m| *m = 0.0);
        return mags;
    }
    mags.iter_mut().for_each(|m| *m /= max);
    mags
}

/// In-place iterative Cooley-Tukey. `re.len()` must be a power of two.
fn fft_radix2(re: &mut [f64], im: &mut [f64]) {
    let n = re.len();

    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j ^= bit;
        if i < j {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let step = -2.0 * PI / len as f64;
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let (sin, cos) = (step * k as f64).sin_cos();
                let a = start + k;
                let b = a + half;
                let tr = re[b] * cos - im[b] * sin;
                let ti = re[b] * sin + im[b] * cos;
                re[b] = re[a] - tr;
                im[b] = im[a] - ti;
                re[a] += tr;
                im[a] += ti;
            }
        }
        len <<= 1;
    }
}
