//! Keyword gate for keeping the bot on sneakers.
//!
//! Off by default. When enabled, a prompt that mentions none of the keywords
//! below is answered with a canned refusal and never reaches the API.

/// Lowercase keywords. Matching is case-insensitive substring search.
const SNEAKER_KEYWORDS: &[&str] = &[
    "sneaker",
    "shoe",
    "kicks",
    "release",
    "drop",
    "raffle",
    "restock",
    "resell",
    "retail",
    "colorway",
    "snkrs",
    "stockx",
    "goat",
    "nike",
    "jordan",
    "adidas",
    "yeezy",
    "new balance",
    "puma",
    "reebok",
    "converse",
    "vans",
    "asics",
    "air max",
    "dunk",
];

/// True if `text` mentions anything sneaker-related.
pub fn is_on_topic(text: &str) -> bool {
    let lowered = text.to_lowercase();
    SNEAKER_KEYWORDS.iter().any(|kw| lowered.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_topic_rules {
        ($($name:ident: $input:expr => $expected:expr),* $(,)?) => {
            $(
                #[test]
                fn $name() {
                    assert_eq!(is_on_topic($input), $expected, "input: {:?}", $input);
                }
            )*
        };
    }

    test_topic_rules! {
        brand_name: "When do the new Jordans drop?" => true,
        mixed_case: "any SNKRS exclusives this week" => true,
        multi_word_keyword: "new balance 550 restock" => true,
        keyword_inside_word: "Sneakerheads unite" => true,
        resale_market: "what's the StockX price" => true,
        weather_question: "What's the weather in Paris?" => false,
        empty_prompt: "" => false,
        math_question: "what is 2 + 2" => false,
    }
}
