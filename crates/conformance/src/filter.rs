use thiserror::Error;

use crate::matrix::{Scenario, TestCase};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error(
        "filter {filter:?} matched 0 cases.\n\
known scenarios:\n  - {known}\n\
hint: filter terms match substrings of case names.\n      \
use `scenario:<name>` to match a scenario exactly, or `name:<substring>` to match case names only."
    )]
    EmptySelection { filter: String, known: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Scenario(String),
    Name(String),
    Auto(String),
}

/// Case selection expression.
///
/// Terms are separated by `,`, `;` or whitespace and matched case-insensitively; a case is selected
/// when any term matches. `scenario:<name>` matches a scenario name exactly, `name:<substring>`
/// matches inside the full case name, and a bare term matches either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    source: String,
    terms: Vec<Term>,
}

impl Filter {
    pub fn parse(filter: &str) -> Self {
        let terms = filter
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .filter_map(|term| {
                let parsed = if let Some(rest) = term.strip_prefix("scenario:") {
                    Term::Scenario(rest.to_string())
                } else if let Some(rest) = term.strip_prefix("name:") {
                    Term::Name(rest.to_string())
                } else {
                    Term::Auto(term)
                };
                match &parsed {
                    Term::Scenario(s) | Term::Name(s) | Term::Auto(s) if s.is_empty() => None,
                    _ => Some(parsed),
                }
            })
            .collect();
        Self {
            source: filter.to_string(),
            terms,
        }
    }

    /// A filter without terms selects everything.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn matches(&self, case: &TestCase) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let scenario = case.scenario().name();
        let name = case.name().to_ascii_lowercase();
        self.terms.iter().any(|term| match term {
            Term::Scenario(s) => scenario == s,
            Term::Name(s) => name.contains(s.as_str()),
            Term::Auto(s) => scenario.contains(s.as_str()) || name.contains(s.as_str()),
        })
    }

    pub fn select(&self, cases: Vec<TestCase>) -> Result<Vec<TestCase>, FilterError> {
        let selected: Vec<TestCase> = cases.into_iter().filter(|c| self.matches(c)).collect();
        if selected.is_empty() {
            let known = Scenario::ALL
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join("\n  - ");
            return Err(FilterError::EmptySelection {
                filter: self.source.clone(),
                known,
            });
        }
        Ok(selected)
    }
}
