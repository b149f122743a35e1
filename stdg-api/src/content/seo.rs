//! SEO quality heuristic for remotely generated articles
//!
//! Score = word-count band + keyword density (first three keywords) + heading
//! markers, clamped to 100. Band edges are inclusive.

/// Score returned for template-generated articles
pub const TEMPLATE_SEO_SCORE: i64 = 85;

const MAX_SCORE: i64 = 100;
const SCORED_KEYWORDS: usize = 3;

/// Compute the 0–100 SEO score of `content` for `keywords`
///
/// - 2000–3000 words: +30, 1500–3500 words: +20, otherwise +10
/// - per keyword (first three): density in [0.5, 2.5] percent → +20, any other
///   nonzero density → +10, absent → 0
/// - `##` present → +10, `###` present → +10
pub fn seo_score(content: &str, keywords: &[String]) -> i64 {
    let word_count = content.split_whitespace().count();

    let mut score = match word_count {
        2000..=3000 => 30,
        1500..=3500 => 20,
        _ => 10,
    };

    let lowered = content.to_lowercase();
    for keyword in keywords.iter().take(SCORED_KEYWORDS) {
        score += keyword_points(&lowered, keyword, word_count);
    }

    if content.contains("##") {
        score += 10;
    }
    if content.contains("###") {
        score += 10;
    }

    score.min(MAX_SCORE)
}

/// Density in percent of `keyword` within already lower-cased content
fn keyword_density(lowered_content: &str, keyword: &str, word_count: usize) -> f64 {
    let keyword = keyword.to_lowercase();
    if keyword.is_empty() || word_count == 0 {
        return 0.0;
    }
    let occurrences = lowered_content.matches(keyword.as_str()).count();
    // Multiply before dividing so exact band edges stay exact
    occurrences as f64 * 100.0 / word_count as f64
}

fn keyword_points(lowered_content: &str, keyword: &str, word_count: usize) -> i64 {
    let density = keyword_density(lowered_content, keyword, word_count);
    if (0.5..=2.5).contains(&density) {
        20
    } else if density > 0.0 {
        10
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `total` words, the first `hits` of which are `keyword`
    fn body(total: usize, keyword: &str, hits: usize) -> String {
        let mut words = Vec::with_capacity(total);
        for i in 0..total {
            words.push(if i < hits { keyword } else { "filler" });
        }
        words.join(" ")
    }

    fn kw(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_word_band_edges() {
        assert_eq!(seo_score(&body(2000, "x", 0), &[]), 30);
        assert_eq!(seo_score(&body(3000, "x", 0), &[]), 30);
        assert_eq!(seo_score(&body(1999, "x", 0), &[]), 20);
        assert_eq!(seo_score(&body(3001, "x", 0), &[]), 20);
        assert_eq!(seo_score(&body(1500, "x", 0), &[]), 20);
        assert_eq!(seo_score(&body(3500, "x", 0), &[]), 20);
        assert_eq!(seo_score(&body(1499, "x", 0), &[]), 10);
        assert_eq!(seo_score(&body(3501, "x", 0), &[]), 10);
    }

    #[test]
    fn test_density_lower_edge_inclusive() {
        // 1 / 200 = 0.5%
        assert_eq!(seo_score(&body(200, "alpha", 1), &kw(&["alpha"])), 10 + 20);
    }

    #[test]
    fn test_density_upper_edge_inclusive() {
        // 5 / 200 = 2.5%
        assert_eq!(seo_score(&body(200, "alpha", 5), &kw(&["alpha"])), 10 + 20);
    }

    #[test]
    fn test_density_just_outside_band() {
        // 1 / 201 ≈ 0.4975%
        assert_eq!(seo_score(&body(201, "alpha", 1), &kw(&["alpha"])), 10 + 10);
        // 6 / 200 = 3%
        assert_eq!(seo_score(&body(200, "alpha", 6), &kw(&["alpha"])), 10 + 10);
    }

    #[test]
    fn test_zero_density_scores_nothing() {
        assert_eq!(seo_score(&body(200, "alpha", 0), &kw(&["alpha"])), 10);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let content = format!("CRM {}", body(199, "x", 0));
        assert_eq!(seo_score(&content, &kw(&["crm"])), 30);
    }

    #[test]
    fn test_only_first_three_keywords_count() {
        let content = format!("a b c d {}", body(196, "x", 0));
        assert_eq!(seo_score(&content, &kw(&["a", "b", "c", "d"])), 10 + 60);
    }

    #[test]
    fn test_heading_markers() {
        assert_eq!(seo_score("## Heading", &[]), 20);
        assert_eq!(seo_score("### Heading", &[]), 30);
        assert_eq!(seo_score("## One\n### Two", &[]), 30);
    }

    #[test]
    fn test_clamped_to_hundred() {
        let mut content = body(2000, "x", 0);
        // 20 hits per keyword in 2063 words ≈ 0.97%
        for k in ["alpha", "beta", "gamma"] {
            for _ in 0..20 {
                content.push_str(" ");
                content.push_str(k);
            }
        }
        content.push_str("\n## Section\n### Sub");
        assert_eq!(seo_score(&content, &kw(&["alpha", "beta", "gamma"])), 100);
    }

    #[test]
    fn test_empty_content() {
        assert_eq!(seo_score("", &kw(&["alpha"])), 10);
    }

    #[test]
    fn test_empty_keyword_contributes_nothing() {
        assert_eq!(seo_score(&body(200, "x", 0), &kw(&[""])), 10);
    }

    #[test]
    fn test_score_always_in_range() {
        let samples = [
            String::new(),
            "## ### ## ###".to_string(),
            body(2500, "crm", 2500),
            body(10, "crm", 3),
        ];
        for content in &samples {
            let score = seo_score(content, &kw(&["crm", "software", "##"]));
            assert!((0..=100).contains(&score), "score {} out of range", score);
        }
    }
}
