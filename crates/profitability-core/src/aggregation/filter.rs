use std::collections::BTreeSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::month::Month;
use crate::records::ProjectRecord;

/// Label the dashboard uses for "no constraint" in multi-selects.
pub const ALL_LABEL: &str = "Tudo";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Selection for one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Choice<T: Ord> {
    /// No constraint.
    All,
    /// Accept only these values. An empty set behaves like `All`.
    Only(BTreeSet<T>),
}

impl<T: Ord> Default for Choice<T> {
    fn default() -> Self {
        Choice::All
    }
}

impl<T: Ord> Choice<T> {
    pub fn only<I: IntoIterator<Item = T>>(values: I) -> Self {
        Choice::Only(values.into_iter().collect())
    }

    pub fn is_all(&self) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(set) => set.is_empty(),
        }
    }

    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Choice::All => true,
            Choice::Only(set) => set.is_empty() || set.contains(value),
        }
    }
}

impl<T: Ord + FromStr> Choice<T> {
    /// Build a choice from user-facing labels. Any occurrence of
    /// [`ALL_LABEL`], or no labels at all, yields `All`.
    pub fn parse_labels<I, S>(labels: I) -> Result<Self, T::Err>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeSet::new();
        for label in labels {
            let label = label.as_ref().trim();
            if label == ALL_LABEL {
                return Ok(Choice::All);
            }
            values.insert(label.parse::<T>()?);
        }
        if values.is_empty() {
            Ok(Choice::All)
        } else {
            Ok(Choice::Only(values))
        }
    }
}

/// The four filter dimensions of the profitability view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// `None` means every year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub months: Choice<Month>,
    #[serde(default)]
    pub clients: Choice<String>,
    #[serde(default)]
    pub projects: Choice<String>,
}

impl Selection {
    /// Selection with every dimension unconstrained.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Self::default()
        }
    }

    /// Conjunction of the four membership tests.
    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.year.map_or(true, |y| y == record.year)
            && self.months.accepts(&record.month)
            && self.clients.accepts(&record.client)
            && self.projects.accepts(&record.project)
    }
}

/// Values available to populate the filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Most recent first.
    pub years: Vec<i32>,
    /// Months present in the chosen year, calendar order.
    pub months: Vec<Month>,
    pub clients: Vec<String>,
    pub projects: Vec<String>,
}

// ---------------------------------------------------------------------------
// Functions
// ---------------------------------------------------------------------------

/// Records matching `selection`, in input order.
pub fn filter_records<'a>(
    records: &'a [ProjectRecord],
    selection: &Selection,
) -> Vec<&'a ProjectRecord> {
    records.iter().filter(|r| selection.matches(r)).collect()
}

/// Distinct filter values. Months are restricted to `year` when given;
/// clients and projects always span the whole dataset.
pub fn filter_options(records: &[ProjectRecord], year: Option<i32>) -> FilterOptions {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    let months: BTreeSet<Month> = records
        .iter()
        .filter(|r| year.map_or(true, |y| y == r.year))
        .map(|r| r.month)
        .collect();
    let clients: BTreeSet<&str> = records
        .iter()
        .map(|r| r.client.as_str())
        .filter(|c| !c.is_empty())
        .collect();
    let projects: BTreeSet<&str> = records
        .iter()
        .map(|r| r.project.as_str())
        .filter(|p| !p.is_empty())
        .collect();

    FilterOptions {
        years: years.into_iter().rev().collect(),
        months: months.into_iter().collect(),
        clients: clients.into_iter().map(String::from).collect(),
        projects: projects.into_iter().map(String::from).collect(),
    }
}
