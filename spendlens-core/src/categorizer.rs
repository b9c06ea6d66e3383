//! Keyword rules mapping transaction descriptions to a [`Category`].
//!
//! Rules are evaluated top to bottom and the first rule with a keyword
//! contained in the lower-cased description wins. Matching is by
//! substring, so "supermarket" matches a "market" keyword.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::finance::Category;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && lowered.contains(k.to_lowercase().as_str()))
    }
}

/// Ordered rule table; order is precedence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<CategoryRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    Category::FoodDining,
                    &[
                        "swiggy", "zomato", "uber eats", "food", "restaurant", "cafe", "pizza",
                        "burger", "dominos", "mcdonald", "kfc", "starbucks", "coffee", "tea",
                        "bakery", "grocery", "bigbasket", "grofers", "dunzo", "zepto",
                    ],
                ),
                CategoryRule::new(
                    Category::Transport,
                    &[
                        "uber", "ola", "rapido", "metro", "bus", "train", "railway", "flight",
                        "airline", "taxi", "cab", "fuel", "petrol", "diesel", "parking", "toll",
                    ],
                ),
                CategoryRule::new(
                    Category::Shopping,
                    &[
                        "amazon", "flipkart", "myntra", "nykaa", "shopping", "store", "mall",
                        "fashion", "clothes", "apparel", "electronics", "phone", "mobile",
                    ],
                ),
                CategoryRule::new(
                    Category::Entertainment,
                    &[
                        "netflix", "prime", "spotify", "youtube", "movie", "cinema", "theatre",
                        "game", "gaming", "playstation", "xbox", "book", "music",
                    ],
                ),
                CategoryRule::new(
                    Category::BillsUtilities,
                    &[
                        "electricity", "water", "gas", "phone", "internet", "wifi", "broadband",
                        "mobile bill", "postpaid", "prepaid", "jio", "airtel", "vodafone",
                        "utility", "bill payment",
                    ],
                ),
                CategoryRule::new(
                    Category::Healthcare,
                    &[
                        "hospital", "clinic", "pharmacy", "medicine", "medical", "doctor",
                        "apollo", "medplus", "1mg", "practo", "health", "insurance",
                    ],
                ),
                CategoryRule::new(
                    Category::Education,
                    &[
                        "school", "college", "university", "tuition", "course", "education",
                        "book", "stationery", "exam", "fee",
                    ],
                ),
                CategoryRule::new(
                    Category::BankingFinance,
                    &[
                        "bank", "atm", "withdrawal", "deposit", "loan", "emi", "credit card",
                        "interest", "charges", "fee", "transfer", "upi",
                    ],
                ),
                CategoryRule::new(
                    Category::Travel,
                    &[
                        "hotel", "booking", "travel", "trip", "vacation", "tour", "tourism",
                        "make my trip", "goibibo", "oyo", "airbnb",
                    ],
                ),
                CategoryRule::new(
                    Category::RechargeDth,
                    &[
                        "recharge", "dth", "tv", "cable", "dish", "tata sky", "airtel digital",
                        "jio", "vodafone idea",
                    ],
                ),
                CategoryRule::new(
                    Category::Investments,
                    &[
                        "mutual fund", "sip", "stocks", "equity", "investment", "fd", "rd",
                        "gold", "crypto", "bitcoin",
                    ],
                ),
            ],
        }
    }
}

impl RuleTable {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Categorize a description. No match falls back to `Other`.
    pub fn categorize(&self, description: &str) -> Category {
        let lowered = description.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.category != Category::Other)
            .find(|r| r.matches(&lowered))
            .map(|r| r.category)
            .unwrap_or(Category::Other)
    }

    /// Insert a rule ahead of every existing rule
    pub fn prepend(&mut self, rule: CategoryRule) {
        self.rules.insert(0, rule);
    }

    /// Add keywords to the first rule of `category`, appending a new rule
    /// at the end when the category has none.
    pub fn extend_category(&mut self, category: Category, keywords: &[&str]) {
        let lowered = keywords.iter().map(|k| k.to_lowercase());
        match self.rules.iter_mut().find(|r| r.category == category) {
            Some(rule) => rule.keywords.extend(lowered),
            None => self.rules.push(CategoryRule {
                category,
                keywords: lowered.collect(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.rules {
            if rule.category != Category::Other
                && rule.keywords.iter().all(|k| k.trim().is_empty())
            {
                return Err(ConfigError::EmptyRule(rule.category.label().to_string()));
            }
        }
        Ok(())
    }
}
