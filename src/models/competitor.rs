//! Competitor data structures and roster parsing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a competitor (used in bouts and lookups).
pub type CompetitorId = Uuid;

/// A competitor in the tournament. Immutable once the bracket is seeded.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    /// Seeding weight; higher means stronger. Used by the weight-ranked policy.
    pub weight: u32,
}

impl Competitor {
    /// Create a new competitor with the given name and seeding weight.
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            weight,
        }
    }
}

/// Errors from parsing a roster CSV upload.
#[derive(Debug)]
pub enum RosterError {
    Csv(csv::Error),
    /// A record is missing the name column or the name is blank.
    MissingName { record: usize },
    /// The weight column is absent or not a number.
    BadWeight { record: usize },
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::Csv(e) => write!(f, "CSV error: {}", e),
            RosterError::MissingName { record } => {
                write!(f, "Record {} has no competitor name", record)
            }
            RosterError::BadWeight { record } => {
                write!(f, "Record {} has a non-numeric weight", record)
            }
        }
    }
}

impl From<csv::Error> for RosterError {
    fn from(e: csv::Error) -> Self {
        RosterError::Csv(e)
    }
}

/// Parse a roster from CSV records of the form `name,weight` (no header row).
/// A missing weight column defaults to 0, which suits the shuffle policy.
pub fn roster_from_csv<R: std::io::Read>(reader: R) -> Result<Vec<Competitor>, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut roster = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let name = record
            .get(0)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or(RosterError::MissingName { record: i + 1 })?;
        let weight = match record.get(1) {
            None | Some("") => 0,
            Some(w) => w
                .parse::<u32>()
                .map_err(|_| RosterError::BadWeight { record: i + 1 })?,
        };
        roster.push(Competitor::new(name, weight));
    }
    Ok(roster)
}
