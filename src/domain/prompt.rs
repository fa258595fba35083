//! Review analysis prompt.
//!
//! The wording, indentation and line breaks below are what the model has been
//! tuned against. Changing any byte changes the outputs.

const INDENT: &str = "                ";

/// Renders the analysis prompt for one review.
pub fn build_review_prompt(review: &str, rating: &str) -> String {
    let lines = [
        String::new(),
        format!("{INDENT}Analyze this Myntra product review:"),
        format!("{INDENT}Review: \"{review}\"  # ✅ Dynamic column"),
        format!("{INDENT}Rating: {rating}"),
        String::new(),
        format!("{INDENT}Provide a concise analysis in this exact format:"),
        format!("{INDENT}1. Sentiment: (Positive / Negative / Neutral)"),
        format!("{INDENT}2. Key points: (Bullet list of 2-3 main pros/cons)"),
        format!("{INDENT}3. Recommendation: (Yes / No / Maybe) - Brief reason"),
        INDENT.to_string(),
    ];
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_verbatim() {
        let expected = "\n                Analyze this Myntra product review:\n                Review: \"Great fit\"  # ✅ Dynamic column\n                Rating: 5\n\n                Provide a concise analysis in this exact format:\n                1. Sentiment: (Positive / Negative / Neutral)\n                2. Key points: (Bullet list of 2-3 main pros/cons)\n                3. Recommendation: (Yes / No / Maybe) - Brief reason\n                ";
        assert_eq!(build_review_prompt("Great fit", "5"), expected);
    }

    #[test]
    fn test_review_text_is_not_escaped() {
        let prompt = build_review_prompt("said \"meh\"", "3");
        assert!(prompt.contains("Review: \"said \"meh\"\"  # ✅ Dynamic column"));
    }
}
