//! Fuzzy TM name lookup shared by the health check and the session tool.

use crate::error::{InputError, Result};
use crate::inventory::DeviceRecord;
use crate::text::normalize;

/// Outcome of looking a search term up in the inventory.
#[derive(Debug, PartialEq, Eq)]
pub enum NameMatch<'a> {
    /// Normalized term equals a record name.
    Exact(&'a DeviceRecord),
    /// Exactly one record contains the term.
    Unique(&'a DeviceRecord),
    /// Several records contain the term, none equals it. Inventory order.
    Ambiguous(Vec<&'a DeviceRecord>),
    NotFound,
}

pub fn match_name<'a>(records: &'a [DeviceRecord], term: &str) -> NameMatch<'a> {
    let key: String = normalize(term);
    let candidates: Vec<&DeviceRecord> = records
        .iter()
        .filter(|r| normalize(&r.name).contains(&key))
        .collect();

    if let Some(exact) = candidates.iter().find(|r| normalize(&r.name) == key) {
        return NameMatch::Exact(*exact);
    }

    match candidates.len() {
        0 => NameMatch::NotFound,
        1 => NameMatch::Unique(candidates[0]),
        _ => NameMatch::Ambiguous(candidates),
    }
}

/// Asks the operator to pick one of several TMs.
///
/// Implementations return the raw answer; [`resolve_name`] interprets it.
pub trait ResolverPrompt {
    fn ask(&mut self, term: &str, candidates: &[&DeviceRecord]) -> Result<String>;
}

/// Prompt for unattended runs. Any ambiguity is an error.
pub struct FailClosedPrompt;

impl ResolverPrompt for FailClosedPrompt {
    fn ask(&mut self, term: &str, candidates: &[&DeviceRecord]) -> Result<String> {
        Err(InputError::Ambiguous {
            term: term.to_string(),
            count: candidates.len(),
        }
        .into())
    }
}

/// A name lookup that ended on one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedName<'a> {
    pub record: &'a DeviceRecord,
    /// Later selection should compare names for equality rather than containment.
    pub exact: bool,
}

pub fn resolve_name<'a>(
    records: &'a [DeviceRecord],
    term: &str,
    prompt: &mut dyn ResolverPrompt,
) -> Result<ResolvedName<'a>> {
    match match_name(records, term) {
        NameMatch::Exact(record) => Ok(ResolvedName {
            record,
            exact: true,
        }),
        NameMatch::Unique(record) => Ok(ResolvedName {
            record,
            exact: false,
        }),
        NameMatch::NotFound => Err(InputError::NoMatch(term.to_string()).into()),
        NameMatch::Ambiguous(candidates) => {
            let answer: String = prompt.ask(term, &candidates)?;
            let index: usize = interpret_answer(&answer, candidates.len())?;
            Ok(ResolvedName {
                record: candidates[index],
                exact: true,
            })
        }
    }
}

/// Maps a menu answer to a zero-based candidate index.
fn interpret_answer(answer: &str, count: usize) -> Result<usize> {
    let answer: &str = answer.trim();
    if answer.eq_ignore_ascii_case("q") {
        return Err(InputError::Cancelled.into());
    }
    match answer.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Ok(n - 1),
        _ => Err(InputError::InvalidSelection(answer.to_string()).into()),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::net::Ipv4Addr;

    struct ScriptedPrompt {
        answer: &'static str,
        shown: Vec<String>,
    }

    impl ResolverPrompt for ScriptedPrompt {
        fn ask(&mut self, _term: &str, candidates: &[&DeviceRecord]) -> Result<String> {
            self.shown = candidates.iter().map(|r| r.name.clone()).collect();
            Ok(self.answer.to_string())
        }
    }

    fn records(names: &[&str]) -> Vec<DeviceRecord> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| DeviceRecord {
                region: 1,
                name: name.to_string(),
                address: Ipv4Addr::new(10, 0, i as u8, 93),
                relay_count: 0,
                switch_count: 1,
                vlan: 0,
            })
            .collect()
    }

    #[test]
    fn ambiguous_term_should_offer_candidates_in_order() {
        let inventory: Vec<DeviceRecord> = records(&["Bagcilar GIS", "Bagcilar TM"]);
        let mut prompt = ScriptedPrompt {
            answer: "2",
            shown: Vec::new(),
        };

        let resolved: ResolvedName = resolve_name(&inventory, "Bagcilar", &mut prompt).unwrap();

        assert_eq!(prompt.shown, vec!["Bagcilar GIS", "Bagcilar TM"]);
        assert_eq!(resolved.record.name, "Bagcilar TM");
        assert!(resolved.exact);
    }

    #[test]
    fn exact_match_should_skip_the_prompt() {
        let inventory: Vec<DeviceRecord> = records(&["Esenler TM", "Esenler"]);
        let resolved: ResolvedName =
            resolve_name(&inventory, "esenler", &mut FailClosedPrompt).unwrap();
        assert_eq!(resolved.record.name, "Esenler");
        assert!(resolved.exact);
    }

    #[test]
    fn single_substring_match_should_resolve_without_exactness() {
        let inventory: Vec<DeviceRecord> = records(&["Karşıyaka TM", "Tuzla"]);
        let resolved: ResolvedName =
            resolve_name(&inventory, "karsiyaka", &mut FailClosedPrompt).unwrap();
        assert_eq!(resolved.record.name, "Karşıyaka TM");
        assert!(!resolved.exact);
    }

    #[test]
    fn headless_prompt_should_fail_closed() {
        let inventory: Vec<DeviceRecord> = records(&["Bagcilar GIS", "Bagcilar TM"]);
        let result = resolve_name(&inventory, "bagcilar", &mut FailClosedPrompt);
        assert!(matches!(
            result,
            Err(Error::Input(InputError::Ambiguous { count: 2, .. }))
        ));
    }

    #[test]
    fn bad_answers_should_be_rejected() {
        assert!(matches!(
            interpret_answer("3", 2),
            Err(Error::Input(InputError::InvalidSelection(_)))
        ));
        assert!(matches!(
            interpret_answer("zero", 2),
            Err(Error::Input(InputError::InvalidSelection(_)))
        ));
        assert!(matches!(interpret_answer("0", 2), Err(_)));
        assert!(interpret_answer(" Q ", 2).unwrap_err().is_cancelled());
        assert_eq!(interpret_answer(" 1\n", 2).unwrap(), 0);
    }

    #[test]
    fn unknown_term_should_not_match() {
        let inventory: Vec<DeviceRecord> = records(&["Tuzla"]);
        assert_eq!(match_name(&inventory, "Sile"), NameMatch::NotFound);
    }
}
