//! Execution environment shared by the domain tools

use agrocam_data::Region;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

/// Clock, randomness and defaults seen by the tools
#[derive(Clone)]
pub struct ToolEnv {
    rng: Arc<Mutex<StdRng>>,
    today: Option<NaiveDate>,
    default_region: Region,
}

impl std::fmt::Debug for ToolEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEnv")
            .field("today", &self.today)
            .field("default_region", &self.default_region)
            .finish_non_exhaustive()
    }
}

impl Default for ToolEnv {
    fn default() -> Self {
        Self::new(Region::Centre)
    }
}

impl ToolEnv {
    /// Entropy-seeded environment using the wall clock
    #[must_use]
    pub fn new(default_region: Region) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::from_entropy())),
            today: None,
            default_region,
        }
    }

    /// Deterministic environment
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(StdRng::seed_from_u64(seed))),
            ..Self::default()
        }
    }

    /// Pin "today" to a fixed date
    #[must_use]
    pub fn with_today(mut self, date: NaiveDate) -> Self {
        self.today = Some(date);
        self
    }

    /// Set the region used when a tool call omits one
    #[must_use]
    pub fn with_default_region(mut self, region: Region) -> Self {
        self.default_region = region;
        self
    }

    /// Current date
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Current month (1-12)
    #[must_use]
    pub fn month(&self) -> u32 {
        self.today().month()
    }

    /// Region used when a call omits one
    #[must_use]
    pub fn default_region(&self) -> Region {
        self.default_region
    }

    /// `region` or the default
    #[must_use]
    pub fn region_or_default(&self, region: Option<Region>) -> Region {
        region.unwrap_or(self.default_region)
    }

    /// Run `f` with exclusive access to the RNG
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_seeded_env_is_reproducible() {
        let a = ToolEnv::seeded(7);
        let b = ToolEnv::seeded(7);
        let xs: Vec<u32> = (0..5).map(|_| a.with_rng(|r| r.gen_range(0..1000))).collect();
        let ys: Vec<u32> = (0..5).map(|_| b.with_rng(|r| r.gen_range(0..1000))).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn test_fixed_today() {
        let env = ToolEnv::seeded(1).with_today(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(env.month(), 7);
        assert_eq!(env.region_or_default(None), Region::Centre);
        assert_eq!(env.region_or_default(Some(Region::Nord)), Region::Nord);
    }
}
