use super::TxnType;

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Alimentação",
    "Transporte",
    "Moradia",
    "Lazer",
    "Saúde",
    "Educação",
    "Outros",
];

pub const INCOME_CATEGORIES: &[&str] = &["Salário", "Freelance", "Investimentos", "Presente", "Outros"];

/// The fixed category set for a transaction type.
pub fn categories_for(kind: TxnType) -> &'static [&'static str] {
    match kind {
        TxnType::Income => INCOME_CATEGORIES,
        TxnType::Expense => EXPENSE_CATEGORIES,
    }
}

/// Category given to fixed entries created without an explicit one.
pub fn default_category(kind: TxnType) -> &'static str {
    match kind {
        TxnType::Income => "Salário",
        TxnType::Expense => "Moradia",
    }
}

/// Resolve a user-typed category name to its canonical spelling.
/// Case and accents are ignored, so `saude` finds `Saúde`.
pub fn find_category(kind: TxnType, name: &str) -> Option<&'static str> {
    let wanted = fold(name.trim());
    categories_for(kind)
        .iter()
        .find(|c| fold(c) == wanted)
        .copied()
}

fn fold(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

pub fn is_valid_category(kind: TxnType, name: &str) -> bool {
    categories_for(kind).contains(&name)
}
