use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// IncomeCategory – derived three-bucket classification of income_level
// ---------------------------------------------------------------------------

/// Derived income bucket. Ordering follows the bin boundaries, so sorted
/// containers list the buckets low → high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IncomeCategory {
    Low,
    Middle,
    High,
}

impl IncomeCategory {
    /// All buckets in bin order, for building dropdown choices.
    pub const ALL: [IncomeCategory; 3] = [
        IncomeCategory::Low,
        IncomeCategory::Middle,
        IncomeCategory::High,
    ];

    /// Parse the label form used in dropdowns and source files.
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "Low Income" => Some(IncomeCategory::Low),
            "Middle Income" => Some(IncomeCategory::Middle),
            "High Income" => Some(IncomeCategory::High),
            _ => None,
        }
    }
}

impl fmt::Display for IncomeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IncomeCategory::Low => "Low Income",
            IncomeCategory::Middle => "Middle Income",
            IncomeCategory::High => "High Income",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// BonusRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single customer record (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct BonusRecord {
    pub country: String,
    pub age_group: String,
    pub income_level: f64,
    pub amount_of_bonuses_received: f64,
    pub revenue_from_bonuses: f64,
    pub customer_lifetime_value: f64,
    pub bonus_roi: f64,
    pub increase_in_wagering_after_bonus: f64,
    pub should_receive_bonus: bool,
    /// Derived bucket; `None` when income_level falls outside the bin range.
    /// Unlabeled rows never match a concrete income-category filter but
    /// survive an unconstrained one.
    pub income_category: Option<IncomeCategory>,
}

// ---------------------------------------------------------------------------
// BonusTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed table with its fixed categorical domains.
///
/// The domains are captured once at load so dropdown choices stay stable no
/// matter what subset is currently selected; the record list is never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct BonusTable {
    /// All records (rows), in file order.
    pub records: Vec<BonusRecord>,
    /// Sorted list of distinct countries.
    pub countries: Vec<String>,
    /// Sorted list of distinct age groups.
    pub age_groups: Vec<String>,
}

impl BonusTable {
    /// Build the table and its categorical domains from loaded records.
    pub fn from_records(records: Vec<BonusRecord>) -> Self {
        let mut countries: BTreeSet<String> = BTreeSet::new();
        let mut age_groups: BTreeSet<String> = BTreeSet::new();

        for rec in &records {
            countries.insert(rec.country.clone());
            age_groups.insert(rec.age_group.clone());
        }

        BonusTable {
            records,
            countries: countries.into_iter().collect(),
            age_groups: age_groups.into_iter().collect(),
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
