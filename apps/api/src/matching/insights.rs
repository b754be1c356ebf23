/// Splits the model's bullet text ("* Pro: ... * Con: ...", one per line or
/// inline) into display items.
pub fn split_bullets(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| line.split(" * "))
        .map(|part| part.trim().trim_start_matches(['*', '-', '•']).trim())
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_inline_bullets() {
        let items = split_bullets("* Pro: Berlin matches. * Con: No German required. * Neutral: Fintech");
        assert_eq!(
            items,
            vec![
                "Pro: Berlin matches.",
                "Con: No German required.",
                "Neutral: Fintech"
            ]
        );
    }

    #[test]
    fn test_splits_lines_and_drops_blanks() {
        let items = split_bullets("- First\n\n  * Second  \n•Third");
        assert_eq!(items, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_plain_sentence_is_one_item() {
        assert_eq!(
            split_bullets("Simulated Insights: Standard insights apply."),
            vec!["Simulated Insights: Standard insights apply."]
        );
        assert!(split_bullets("").is_empty());
    }
}
