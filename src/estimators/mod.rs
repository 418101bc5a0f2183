//! A collection of discrete Bayesian state estimators.

pub mod histogram;
