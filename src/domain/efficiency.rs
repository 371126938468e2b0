// Per-vehicle-version efficiency history
use std::collections::HashMap;

/// Average Wh/mile observed for each vehicle software version of one owner
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyProfile {
    averages: HashMap<String, f64>,
}

impl EfficiencyProfile {
    pub fn new(averages: HashMap<String, f64>) -> Self {
        Self { averages }
    }

    pub fn insert(&mut self, version: impl Into<String>, wh_per_mile: f64) {
        self.averages.insert(version.into(), wh_per_mile);
    }

    /// Average efficiency for `version`, 0 when the version is unknown
    pub fn average_for(&self, version: Option<&str>) -> f64 {
        version
            .and_then(|v| self.averages.get(v))
            .copied()
            .filter(|avg| avg.is_finite())
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.averages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.averages.is_empty()
    }
}

impl FromIterator<(String, f64)> for EfficiencyProfile {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
