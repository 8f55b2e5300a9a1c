use std::collections::HashMap;

/// Key ingredient quantities are merged under: (name, measurement unit).
pub type AggregationKey = (String, String);

/// One resolved ingredient line from a recipe in a user's cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: u64,
}

/// Consolidated shopping list for one user.
///
/// Built fresh per request from the cart snapshot and discarded after
/// rendering; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShoppingList {
    totals: HashMap<AggregationKey, u64>,
}

/// Aggregate ingredient lines across every recipe in the cart.
///
/// Amounts for identical (name, unit) pairs are summed, never overwritten.
/// Addition is commutative, so traversal order does not affect the totals.
/// An empty cart produces an empty list, not an error.
pub fn aggregate<I>(lines: I) -> ShoppingList
where
    I: IntoIterator<Item = IngredientLine>,
{
    let mut totals: HashMap<AggregationKey, u64> = HashMap::new();

    for line in lines {
        let key = (line.name, line.measurement_unit);
        *totals.entry(key).or_insert(0) += line.amount;
    }

    ShoppingList { totals }
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Summed amount for one (name, unit) key, if present.
    pub fn total(&self, name: &str, measurement_unit: &str) -> Option<u64> {
        self.totals
            .get(&(name.to_owned(), measurement_unit.to_owned()))
            .copied()
    }

    /// Render the list as the plain-text report served to the user.
    ///
    /// Header line naming the owner, a blank line, then one
    /// `{name} ({unit}) — {amount}` line per entry in ascending name order.
    /// Entries are sorted by name only: two ingredients sharing a name but
    /// differing in unit may appear in either relative order.
    pub fn render(&self, username: &str) -> String {
        let mut entries: Vec<(&AggregationKey, &u64)> = self.totals.iter().collect();
        entries.sort_by(|a, b| a.0.0.cmp(&b.0.0));

        let mut out = format!("Shopping list for {username}\n\n");
        for ((name, unit), amount) in entries {
            out.push_str(&format!("{name} ({unit}) — {amount}\n"));
        }

        out
    }
}
