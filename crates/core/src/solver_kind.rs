use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownSolverKind;

/// Selector for the backend engine a task must be solved with.
///
/// The ordinals are persisted in serialized task envelopes and must never be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum SolverKind {
    Clp = 0,
    Dummy = 1,
    FractionalKnapsack = 2,
    Glpk = 3,
    LpSolve = 4,
    Scip = 5,
    Symphony = 6,
}

impl SolverKind {
    pub const ALL: [SolverKind; 7] = [
        SolverKind::Clp,
        SolverKind::Dummy,
        SolverKind::FractionalKnapsack,
        SolverKind::Glpk,
        SolverKind::LpSolve,
        SolverKind::Scip,
        SolverKind::Symphony,
    ];

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Stable upper-case name, as used in logs and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            SolverKind::Clp => "CLP",
            SolverKind::Dummy => "DUMMY",
            SolverKind::FractionalKnapsack => "FRACTIONAL_KNAPSACK",
            SolverKind::Glpk => "GLPK",
            SolverKind::LpSolve => "LP_SOLVE",
            SolverKind::Scip => "SCIP",
            SolverKind::Symphony => "SYMPHONY",
        }
    }
}

impl TryFrom<u8> for SolverKind {
    type Error = UnknownSolverKind;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SolverKind::ALL
            .get(value as usize)
            .copied()
            .ok_or(UnknownSolverKind(value))
    }
}

impl From<SolverKind> for u8 {
    fn from(kind: SolverKind) -> u8 {
        kind.ordinal()
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        SolverKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| format!("unknown solver kind: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinals_are_stable() {
        assert_eq!(SolverKind::Clp.ordinal(), 0);
        assert_eq!(SolverKind::Dummy.ordinal(), 1);
        assert_eq!(SolverKind::FractionalKnapsack.ordinal(), 2);
        assert_eq!(SolverKind::Glpk.ordinal(), 3);
        assert_eq!(SolverKind::LpSolve.ordinal(), 4);
        assert_eq!(SolverKind::Scip.ordinal(), 5);
        assert_eq!(SolverKind::Symphony.ordinal(), 6);
    }

    #[test]
    fn try_from_rejects_out_of_range() {
        assert_eq!(SolverKind::try_from(5), Ok(SolverKind::Scip));
        assert_eq!(SolverKind::try_from(7), Err(UnknownSolverKind(7)));
    }

    #[test]
    fn serializes_by_ordinal() {
        let json = serde_json::to_string(&SolverKind::Glpk).unwrap();
        assert_eq!(json, "3");
        let kind: SolverKind = serde_json::from_str("2").unwrap();
        assert_eq!(kind, SolverKind::FractionalKnapsack);
        assert!(serde_json::from_str::<SolverKind>("42").is_err());
    }

    #[test]
    fn parses_names() {
        assert_eq!("lp-solve".parse::<SolverKind>(), Ok(SolverKind::LpSolve));
        assert_eq!("Dummy".parse::<SolverKind>(), Ok(SolverKind::Dummy));
        assert!("cplex".parse::<SolverKind>().is_err());
    }
}
