//! Search query construction for keyword-indexed catalogs.
//!
//! Catalog search indexes match on terms, so a full sentence like
//! "I need a table with monthly sales per region" is reduced to the business
//! nouns it mentions before being sent.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Business nouns recognised in requests (English and Spanish).
const BUSINESS_KEYWORDS: &[&str] = &[
    "cliente", "customer", "customers",
    "pedido", "order", "orders",
    "producto", "product", "products",
    "venta", "sale", "sales",
    "factura", "invoice", "invoices",
    "pago", "payment", "payments",
    "usuario", "user", "users",
    "empleado", "employee", "employees",
    "categoria", "category", "categories",
    "proveedor", "supplier", "suppliers",
    "inventario", "inventory",
    "almacen", "warehouse",
    "ciudad", "city", "cities",
    "region", "regions",
    "pais", "country", "countries",
];

/// Words never worth searching for.
pub(crate) const STOP_WORDS: &[&str] = &[
    "de", "la", "el", "en", "y", "con", "por", "para", "una", "un", "que", "los", "las", "del",
    "al", "se", "su", "ha", "he", "quiero", "necesito", "crear", "tabla", "datos", "base",
    "aparezca", "hecho", "total", "media", "nombre", "need", "want", "with", "table", "data",
    "that", "this", "from", "show", "give", "please", "create", "where", "which", "have",
];

/// Maximum number of fallback words used when no business noun is present.
const MAX_FALLBACK_WORDS: usize = 5;

static DATABASE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)base de datos\s+([A-Za-z0-9_\s]+?)(?:\s+y\s+|\s+and\s+|\s*,|\s+con\s|\s+with\s|\s*$)",
        r"(?i)database\s+([A-Za-z0-9_\s]+?)(?:\s+y\s+|\s+and\s+|\s*,|\s+con\s|\s+with\s|\s*$)",
        r"(?i)\bde\s+([A-Za-z0-9_\s]+?)\s+y\s+crea",
        r"(?i)\ben\s+([A-Za-z0-9_\s]+?)(?:\s+quiero|\s+necesito)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract the business keywords mentioned in a request.
///
/// Falls back to the first few significant words (4+ letters, not stop
/// words) when no known business noun appears. May return an empty list.
pub fn extract_keywords(request: &str) -> Vec<String> {
    let lower = request.to_lowercase();

    let keywords: Vec<String> = BUSINESS_KEYWORDS
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| k.to_string())
        .collect();

    if !keywords.is_empty() {
        return dedup_preserving_order(keywords);
    }

    let words = lower
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= 4)
        .filter(|w| !STOP_WORDS.contains(w))
        .map(str::to_string)
        .collect();

    dedup_preserving_order(words)
        .into_iter()
        .take(MAX_FALLBACK_WORDS)
        .collect()
}

/// Detect a database the user explicitly named ("... from database Sales DW").
pub fn extract_database_filter(request: &str) -> Option<String> {
    DATABASE_PATTERNS.iter().find_map(|re| {
        re.captures(request)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Build the free-text query sent to the catalog index.
///
/// Returns `*` when nothing searchable could be extracted.
pub fn build_search_query(request: &str) -> String {
    let keywords = extract_keywords(request);
    if keywords.is_empty() {
        "*".to_string()
    } else {
        keywords.join(" ")
    }
}

fn dedup_preserving_order(words: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(words.len());
    for w in words {
        if !seen.contains(&w) {
            seen.push(w);
        }
    }
    seen
}
