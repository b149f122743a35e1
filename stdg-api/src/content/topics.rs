//! Topic lists and keyword/category heuristics used by automatic generation

/// Categories offered to editors
pub const SAAS_CATEGORIES: [&str; 20] = [
    "CRM Software",
    "Project Management",
    "Email Marketing",
    "Analytics Tools",
    "Design Tools",
    "Development Tools",
    "Customer Support",
    "Accounting Software",
    "HR Management",
    "Social Media Management",
    "E-commerce Platforms",
    "Sales Tools",
    "Marketing Automation",
    "Cloud Storage",
    "Security Tools",
    "Productivity Apps",
    "Communication Tools",
    "Business Intelligence",
    "Content Management",
    "SEO Tools",
];

/// Rotation for the daily auto-publish job (indexed by day of month)
pub const DAILY_TOPICS: [&str; 20] = [
    "Best CRM Software for Small Business",
    "Top Project Management Tools Comparison",
    "Email Marketing Automation Platforms",
    "Analytics Tools for Data-Driven Decisions",
    "Design Software for Non-Designers",
    "Development Tools for Modern Teams",
    "Customer Support Solutions Review",
    "Accounting Software for Freelancers",
    "HR Management Systems Comparison",
    "Social Media Management Tools",
    "E-commerce Platform Showdown",
    "Sales Automation Software Guide",
    "Marketing Automation Best Practices",
    "Cloud Storage Solutions Compared",
    "Cybersecurity Tools for Small Business",
    "Productivity Apps That Actually Work",
    "Team Communication Platforms",
    "Business Intelligence Tools Review",
    "Content Management Systems Guide",
    "SEO Tools for Better Rankings",
];

/// Fixed list walked by bulk generation
pub const BULK_TOPICS: [&str; 25] = [
    "Best CRM Software for Small Business 2025",
    "Top Project Management Tools Comparison",
    "Email Marketing Automation Platforms Review",
    "Analytics Tools for Data-Driven Decisions",
    "Design Software for Non-Designers Guide",
    "Development Tools for Modern Teams",
    "Customer Support Solutions Comparison",
    "Accounting Software for Freelancers",
    "HR Management Systems Review",
    "Social Media Management Tools Guide",
    "E-commerce Platform Showdown 2025",
    "Sales Automation Software Review",
    "Marketing Automation Best Practices",
    "Cloud Storage Solutions Compared",
    "Cybersecurity Tools for Small Business",
    "Productivity Apps That Actually Work",
    "Team Communication Platforms Guide",
    "Business Intelligence Tools Review",
    "Content Management Systems Comparison",
    "SEO Tools for Better Rankings 2025",
    "Invoicing Software for Small Business",
    "Video Conferencing Tools Comparison",
    "Password Managers for Teams",
    "Backup Solutions for Businesses",
    "Website Builders for Professionals",
];

/// Category used when no rule matches
pub const FALLBACK_CATEGORY: &str = "SaaS Tools";

const EXTRA_KEYWORDS: [&str; 7] = [
    "saas",
    "software",
    "tool",
    "platform",
    "solution",
    "review",
    "comparison",
];

/// Ordered rules: the first rule with any matching needle wins
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["crm"], "CRM Software"),
    (&["project", "management"], "Project Management"),
    (&["email", "marketing"], "Email Marketing"),
    (&["analytics"], "Analytics Tools"),
    (&["design"], "Design Tools"),
    (&["development"], "Development Tools"),
    (&["support"], "Customer Support"),
    (&["accounting"], "Accounting Software"),
    (&["hr"], "HR Management"),
    (&["social"], "Social Media Management"),
    (&["ecommerce", "e-commerce"], "E-commerce Platforms"),
    (&["sales"], "Sales Tools"),
    (&["cloud", "storage"], "Cloud Storage"),
    (&["security"], "Security Tools"),
    (&["productivity"], "Productivity Apps"),
    (&["communication"], "Communication Tools"),
    (&["business intelligence"], "Business Intelligence"),
    (&["content"], "Content Management"),
    (&["seo"], "SEO Tools"),
];

/// Keywords for a topic: its lower-cased words, then generic SaaS terms
pub fn keywords_for_topic(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .chain(EXTRA_KEYWORDS.iter().map(|k| k.to_string()))
        .collect()
}

/// Category for a topic by substring rules (first match wins)
pub fn category_for_topic(topic: &str) -> &'static str {
    let lowered = topic.to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(_, category)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// Tags derived from keywords (first five)
pub fn tags_from_keywords(keywords: &[String]) -> Vec<String> {
    keywords.iter().take(5).cloned().collect()
}

/// Daily topic for a day of month (1-based)
pub fn daily_topic(day_of_month: u32) -> &'static str {
    DAILY_TOPICS[day_of_month as usize % DAILY_TOPICS.len()]
}
