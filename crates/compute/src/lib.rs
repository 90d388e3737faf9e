pub mod algorithms;

pub use algorithms::spectral::{
    component_spectra, dominant_bin, magnitude_spectrum, magnitude_spectrum_fast, MAX_BINS,
};
