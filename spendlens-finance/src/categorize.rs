//! Categorization pass over validated transactions.

use spendlens_core::{RuleTable, Transaction};

/// Attach a category to every transaction. Transactions that already carry
/// one keep it.
pub fn categorize_all(txns: Vec<Transaction>, rules: &RuleTable) -> Vec<Transaction> {
    txns.into_iter()
        .map(|t| {
            let category = rules.categorize(&t.description);
            t.with_category(category)
        })
        .collect()
}
