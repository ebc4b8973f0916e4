//! Crafter display selection.

use craftwise_common::CharacterName;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::resolver::CraftabilityVerdict;

/// Which crafter to show for a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrafterDisplay {
    /// Character shown.
    pub name: CharacterName,
    /// Number of other capable characters, preferred or not.
    pub others_count: usize,
}

impl CrafterDisplay {
    /// Label such as `Aria` or `Aria (+2)`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.others_count == 0 {
            self.name.to_string()
        } else {
            format!("{} (+{})", self.name, self.others_count)
        }
    }
}

/// Picks the character to display for a verdict.
///
/// The first capable character that is also preferred wins; with no
/// preferred match the first capable character is shown.
#[must_use]
pub fn select(
    verdict: &CraftabilityVerdict,
    preferred: &HashSet<CharacterName>,
) -> Option<CrafterDisplay> {
    let capable = &verdict.capable_characters;
    let first = capable.first()?;

    let chosen = capable
        .iter()
        .find(|c| preferred.contains(&c.character))
        .unwrap_or(first);

    Some(CrafterDisplay {
        name: chosen.character.clone(),
        others_count: capable.len() - 1,
    })
}
