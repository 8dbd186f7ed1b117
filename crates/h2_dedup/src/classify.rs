/// Tag a text with every configured keyword that appears in it as a
/// case-insensitive substring. Output preserves the keyword list's order
/// and carries each keyword at most once.
pub fn classify_by_keywords(text: &str, keywords: &[String]) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<String> = Vec::new();
    for keyword in keywords {
        if lower.contains(&keyword.to_lowercase()) && !found.iter().any(|k| k == keyword) {
            found.push(keyword.clone());
        }
    }
    found
}
