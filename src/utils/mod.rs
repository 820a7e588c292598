//! Utility modules for landmark_mcl

pub mod plotting;

pub use plotting::{colors, plot_belief, plot_divergence, save_svg};
