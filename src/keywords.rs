//! Free-text keyword extraction and target-language classification.
//!
//! Titles and channel names are mixed-script (Latin, kana, kanji, often all
//! three in one string), so tokenization happens in two stages: Unicode word
//! segmentation for the non-CJK spans, and script-boundary splitting for the
//! CJK runs. Everything here is pure and deterministic.

use lazy_static::lazy_static;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use whatlang::{detect, Lang};

use crate::types::Candidate;

lazy_static! {
    /// Tokens with no profiling value: English function words plus the
    /// domain-generic vocabulary every upload carries.
    static ref STOPWORDS: HashSet<&'static str> = [
        // English function words
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from",
        "has", "how", "in", "is", "it", "of", "on", "or", "that", "the",
        "this", "to", "was", "what", "when", "where", "who", "will", "with",
        "you", "your",
        // Domain-generic markers
        "video", "videos", "official", "channel", "shorts", "short", "live",
        "full", "new",
        "動画", "公式", "チャンネル", "ライブ", "配信",
        // Japanese grammar fragments long enough to survive the length filter
        "です", "ます", "する", "した", "して", "いる", "ある", "この",
        "その", "あの", "こと", "もの", "ため", "よう", "から", "まで",
        "など", "って", "とは", "ついて", "ください",
    ]
    .iter()
    .copied()
    .collect();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Kanji,
    Hiragana,
    Katakana,
    Other,
}

fn char_class(c: char) -> CharClass {
    match c as u32 {
        0x3041..=0x309F => CharClass::Hiragana,
        // Prolonged sound mark and katakana letters; the middle dot is a
        // separator, not part of a word.
        0x30A0..=0x30FF if c != '・' => CharClass::Katakana,
        0x3400..=0x4DBF | 0x4E00..=0x9FFF => CharClass::Kanji,
        0x3005 => CharClass::Kanji, // 々 iteration mark
        _ => CharClass::Other,
    }
}

fn is_hiragana(c: char) -> bool {
    char_class(c) == CharClass::Hiragana
}

/// A token survives when it is not a stopword, not a single character, not
/// purely numeric, and (for hiragana-only tokens, which are mostly grammar)
/// at least three characters long.
fn is_informative(token: &str) -> bool {
    if STOPWORDS.contains(token) {
        return false;
    }
    let chars = token.chars().count();
    if chars < 2 {
        return false;
    }
    if token.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if token.chars().all(is_hiragana) && chars < 3 {
        return false;
    }
    true
}

fn push_token(token: &str, keywords: &mut HashSet<String>) {
    if is_informative(token) {
        keywords.insert(token.to_string());
    }
}

/// Segment a non-CJK span on Unicode word boundaries.
fn push_span_words(span: &str, keywords: &mut HashSet<String>) {
    for word in span.unicode_words() {
        push_token(word, keywords);
    }
}

/// Extracts the set of normalized keyword tokens from free text.
///
/// NFKC-normalizes and lowercases, then segments: non-CJK spans on Unicode
/// word boundaries, CJK runs on script boundaries (kanji / hiragana /
/// katakana). Uninformative tokens are discarded.
pub fn extract_keywords(text: &str) -> HashSet<String> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();

    let mut keywords = HashSet::new();
    let mut span = String::new();
    let mut run = String::new();
    let mut run_class = CharClass::Other;

    for c in normalized.chars() {
        let class = char_class(c);
        if class == CharClass::Other {
            if !run.is_empty() {
                push_token(&run, &mut keywords);
                run.clear();
            }
            span.push(c);
            continue;
        }
        if !span.is_empty() {
            push_span_words(&span, &mut keywords);
            span.clear();
        }
        if class != run_class && !run.is_empty() {
            push_token(&run, &mut keywords);
            run.clear();
        }
        run.push(c);
        run_class = class;
    }
    if !run.is_empty() {
        push_token(&run, &mut keywords);
    }
    if !span.is_empty() {
        push_span_words(&span, &mut keywords);
    }

    keywords
}

/// Keywords of a candidate: the union over its title and channel name.
pub fn candidate_keywords(candidate: &Candidate) -> HashSet<String> {
    let mut keywords = extract_keywords(&candidate.title);
    keywords.extend(extract_keywords(&candidate.channel_name));
    keywords
}

/// Classifies whether text is Japanese.
///
/// Any kana is conclusive. Kanji-only text is ambiguous with Chinese, so it
/// is accepted unless language detection reliably says Mandarin. Everything
/// else is not Japanese.
pub fn is_japanese_text(text: &str) -> bool {
    let mut saw_kanji = false;
    for c in text.chars() {
        match char_class(c) {
            CharClass::Hiragana | CharClass::Katakana => return true,
            CharClass::Kanji => saw_kanji = true,
            CharClass::Other => {}
        }
    }
    if saw_kanji {
        return !matches!(detect(text), Some(info) if info.lang() == Lang::Cmn && info.is_reliable());
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latin_extraction() {
        let keywords = extract_keywords("The Official Minecraft Speedrun Video");
        assert!(keywords.contains("minecraft"));
        assert!(keywords.contains("speedrun"));
        // Stopwords and domain-generic words are dropped.
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("official"));
        assert!(!keywords.contains("video"));
    }

    #[test]
    fn test_mixed_script_extraction() {
        let keywords = extract_keywords("【Minecraft】建築講座 #shorts");
        assert!(keywords.contains("minecraft"));
        assert!(keywords.contains("建築講座"));
        // The shorts marker carries no signal.
        assert!(!keywords.contains("shorts"));
    }

    #[test]
    fn test_script_boundary_splitting() {
        let keywords = extract_keywords("アニメの名場面まとめ");
        assert!(keywords.contains("アニメ"));
        assert!(keywords.contains("名場面"));
        assert!(keywords.contains("まとめ"));
        // Single-character hiragana particles never survive.
        assert!(!keywords.contains("の"));
    }

    #[test]
    fn test_uninformative_tokens_dropped() {
        let keywords = extract_keywords("2024 x この");
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_halfwidth_katakana_normalized() {
        // NFKC folds halfwidth katakana into the standard block.
        let keywords = extract_keywords("ｹﾞｰﾑ実況");
        assert!(keywords.contains("ゲーム"));
        assert!(keywords.contains("実況"));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let a = extract_keywords("料理レシピ Cooking with ケンジ");
        let b = extract_keywords("料理レシピ Cooking with ケンジ");
        assert_eq!(a, b);
    }

    #[test]
    fn test_japanese_detection() {
        assert!(is_japanese_text("これはテストです"));
        assert!(is_japanese_text("ゲーム実況"));
        assert!(is_japanese_text("面白い瞬間まとめ #shorts"));
        assert!(!is_japanese_text("English only title"));
        assert!(!is_japanese_text(""));
        assert!(!is_japanese_text("123 !!"));
    }
}
