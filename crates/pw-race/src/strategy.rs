//! Strategy records: an ordered list of stints.

use std::fmt;

use pw_core::StrategyId;

/// A contiguous span of laps on one compound.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stint {
    /// Compound name, resolved against a `CompoundTable` at build time.
    pub compound: String,
    /// Planned length in laps.
    pub laps:     u32,
}

impl Stint {
    pub fn new(compound: impl Into<String>, laps: u32) -> Self {
        Stint { compound: compound.into(), laps }
    }
}

/// A candidate pit-stop and tyre plan.
///
/// Unvalidated: lengths, compounds, and regulatory rules are checked by
/// [`RaceBuilder`][crate::RaceBuilder] against a specific circuit.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Strategy {
    pub id:     StrategyId,
    pub stints: Vec<Stint>,
}

impl Strategy {
    pub fn new(id: StrategyId, stints: Vec<Stint>) -> Self {
        Strategy { id, stints }
    }

    /// Shorthand for tests and demos: `[("C3", 30), ("C2", 30)]`.
    pub fn from_pairs(id: StrategyId, pairs: &[(&str, u32)]) -> Self {
        Strategy {
            id,
            stints: pairs.iter().map(|&(c, l)| Stint::new(c, l)).collect(),
        }
    }

    /// Stops implied by the stint count (`stints − 1`, 0 when empty).
    #[inline]
    pub fn pit_stop_count(&self) -> u32 {
        self.stints.len().saturating_sub(1) as u32
    }

    /// Sum of stint lengths.
    pub fn total_laps(&self) -> u32 {
        self.stints.iter().map(|s| s.laps).sum()
    }

    /// Laps on which a stop is taken: the cumulative stint boundaries, last
    /// stint excluded.  `[30, 30]` → `[30]`.
    pub fn pit_laps(&self) -> Vec<u32> {
        let mut lap = 0;
        let mut out = Vec::with_capacity(self.stints.len().saturating_sub(1));
        for stint in self.stints.iter().take(self.stints.len().saturating_sub(1)) {
            lap += stint.laps;
            out.push(lap);
        }
        out
    }

    /// Compound names in stint order.
    pub fn compounds(&self) -> impl Iterator<Item = &str> {
        self.stints.iter().map(|s| s.compound.as_str())
    }

    /// Human-readable label: `C3:30-C2:30`.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stint) in self.stints.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{}:{}", stint.compound, stint.laps)?;
        }
        Ok(())
    }
}
