//! URL handling module for Gleaner
//!
//! This module provides host extraction and the link-filter policy that keeps
//! deep crawls on the site they started from.

mod domain;
mod filter;

pub use domain::{extract_domain, host_of};
pub use filter::LinkFilter;
