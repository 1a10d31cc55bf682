use std::collections::{HashMap, HashSet};

use crate::error::ConfigError;
use crate::model::{Descriptor, ParsingMode};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LongResolution {
    Matched(usize),
    Ambiguous(Vec<String>),
    Unknown,
}

// Resolution table from names/aliases to descriptor ids.
// Positional arguments are not name-matchable; short names only exist in long/short mode.
#[derive(Debug)]
pub(crate) struct NameTable {
    longs: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
    prefix_aliases: bool,
}

impl NameTable {
    pub(crate) fn new(
        descriptors: &[Descriptor],
        mode: ParsingMode,
        prefix_aliases: bool,
    ) -> Result<Self, ConfigError> {
        let mut identities: HashSet<String> = HashSet::default();
        let mut longs: HashMap<String, usize> = HashMap::default();
        let mut shorts: HashMap<char, usize> = HashMap::default();

        for (id, descriptor) in descriptors.iter().enumerate() {
            if !identities.insert(descriptor.name.clone()) {
                return Err(ConfigError(format!(
                    "Cannot duplicate the parameter '{n}'.",
                    n = descriptor.name
                )));
            }

            if descriptor.positional {
                continue;
            }

            if !descriptor.long_suppressed {
                longs.insert(descriptor.name.clone(), id);
            }

            for alias in &descriptor.aliases {
                if !identities.insert(alias.clone()) {
                    return Err(ConfigError(format!(
                        "Cannot duplicate the parameter name '{alias}'."
                    )));
                }

                longs.insert(alias.clone(), id);
            }

            if matches!(mode, ParsingMode::LongShort) {
                for short in descriptor.short.iter().chain(&descriptor.short_aliases) {
                    if shorts.insert(*short, id).is_some() {
                        return Err(ConfigError(format!(
                            "Cannot duplicate the short name '{short}'."
                        )));
                    }
                }
            }
        }

        Ok(Self {
            longs,
            shorts,
            prefix_aliases,
        })
    }

    pub(crate) fn resolve_long(&self, name: &str) -> LongResolution {
        if let Some(&id) = self.longs.get(name) {
            return LongResolution::Matched(id);
        }

        if self.prefix_aliases && !name.is_empty() {
            let mut candidates: Vec<(&str, usize)> = self
                .longs
                .iter()
                .filter(|(known, _)| known.starts_with(name))
                .map(|(known, &id)| (known.as_str(), id))
                .collect();
            candidates.sort();

            let distinct: HashSet<usize> = candidates.iter().map(|(_, id)| *id).collect();

            match distinct.len() {
                0 => LongResolution::Unknown,
                1 => LongResolution::Matched(candidates[0].1),
                _ => LongResolution::Ambiguous(
                    candidates
                        .into_iter()
                        .map(|(known, _)| known.to_string())
                        .collect(),
                ),
            }
        } else {
            LongResolution::Unknown
        }
    }

    pub(crate) fn resolve_short(&self, short: char) -> Option<usize> {
        self.shorts.get(&short).copied()
    }
}
