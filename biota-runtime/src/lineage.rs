//! Cosmetic lineage markers
//!
//! A marker is a hue in degrees. Roots draw one uniformly, children inherit
//! their parent's hue with a small drift. Markers only tag memory cells for
//! observation; the interpreter never branches on them.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Hue in degrees, always in `[0, 360)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineageMarker(u16);

impl LineageMarker {
    /// Number of distinct hues
    pub const HUES: u16 = 360;

    /// Largest hue shift applied per generation, in degrees
    pub const MAX_DRIFT: i32 = 10;

    /// Build a marker, wrapping `hue` into range
    pub fn new(hue: u16) -> Self {
        Self(hue % Self::HUES)
    }

    /// Uniformly random marker for a root process
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..Self::HUES))
    }

    /// Marker for a child: this hue shifted by up to [`Self::MAX_DRIFT`] degrees
    pub fn drift<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let delta = rng.gen_range(-Self::MAX_DRIFT..=Self::MAX_DRIFT);
        let hue = (i32::from(self.0) + delta).rem_euclid(i32::from(Self::HUES));
        Self(hue as u16)
    }

    #[inline]
    pub fn hue(self) -> u16 {
        self.0
    }

    /// False for markers that could only come from a corrupt snapshot
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < Self::HUES
    }
}

impl fmt::Display for LineageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({}, 100%, 50%)", self.0)
    }
}
