//! Deterministic article template
//!
//! Content and layout are kept apart: [`build_document`] fills a structured
//! [`ArticleDocument`] (named sections of typed blocks) from the title,
//! category, tags and resolved affiliate entry; [`render_document`] turns any
//! document into HTML with maud, which escapes text and always emits balanced
//! markup.

use maud::{html, Markup};
use stdg_common::db::AffiliateLink;

use super::affiliate::AffiliateEntry;

/// Inputs of the template path
#[derive(Debug, Clone, Copy)]
pub struct TemplateInput<'a> {
    pub title: &'a str,
    pub category: &'a str,
    pub tags: &'a [String],
    pub affiliate: &'a AffiliateEntry,
}

/// Rendered template output
#[derive(Debug, Clone)]
pub struct TemplateOutput {
    pub body: String,
    pub excerpt: String,
    pub meta_description: String,
}

/// A whole article as data
#[derive(Debug, Clone)]
pub struct ArticleDocument {
    pub title: String,
    pub sections: Vec<Section>,
}

/// One named `<section>` with an `<h2>` heading
#[derive(Debug, Clone)]
pub struct Section {
    pub id: &'static str,
    pub heading: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(String),
    Bullets(Vec<ListItem>),
    Steps(Vec<ListItem>),
    PricingTable(Vec<PricingTier>),
    ProsCons { pros: Vec<String>, cons: Vec<String> },
    Stats(Vec<Stat>),
    CallToAction(CallToAction),
    Subsection { heading: String, blocks: Vec<Block> },
}

#[derive(Debug, Clone)]
pub struct ListItem {
    pub label: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct PricingTier {
    pub name: &'static str,
    pub monthly_usd: u32,
    pub best_for: &'static str,
}

#[derive(Debug, Clone)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone)]
pub struct CallToAction {
    pub text: String,
    pub links: Vec<AffiliateLink>,
}

/// Three-tier pricing shown on every template article
pub const PRICING_TIERS: [(&str, u32, &str); 3] = [
    ("Starter", 29, "Small teams getting started"),
    ("Professional", 79, "Growing businesses"),
    ("Enterprise", 199, "Large organizations with advanced needs"),
];

fn labeled(label: &str, text: impl Into<String>) -> ListItem {
    ListItem {
        label: Some(label.to_string()),
        text: text.into(),
    }
}

fn plain(text: impl Into<String>) -> ListItem {
    ListItem {
        label: None,
        text: text.into(),
    }
}

/// Call-to-action block for a resolved affiliate entry
pub fn call_to_action(affiliate: &AffiliateEntry) -> CallToAction {
    CallToAction {
        text: affiliate.cta.clone(),
        links: affiliate.links(),
    }
}

/// Fill the standard review document
pub fn build_document(input: &TemplateInput<'_>) -> ArticleDocument {
    let title = input.title;
    let category = input.category;
    let category_lower = category.to_lowercase();
    let primary = &input.affiliate.primary_name;
    let cta = call_to_action(input.affiliate);

    let mut sections = vec![
        Section {
            id: "introduction",
            heading: "Introduction".to_string(),
            blocks: vec![
                Block::Paragraph(format!(
                    "In today's competitive business landscape, finding the right {} solution is crucial for success. \
                     This guide to {} walks through the features, pricing and trade-offs that matter so you can make \
                     an informed decision for your business.",
                    category_lower, title
                )),
                Block::Paragraph(format!(
                    "We evaluated the leading {} products on ease of use, integrations, support quality and total \
                     cost of ownership. Our top pick for most teams is {}.",
                    category_lower, primary
                )),
            ],
        },
        Section {
            id: "definition",
            heading: format!("What is {}?", title),
            blocks: vec![Block::Paragraph(format!(
                "{} covers the cutting-edge solutions in the {} space. These tools streamline operations, improve \
                 efficiency and drive business growth through automation, shared data and intuitive interfaces.",
                title, category
            ))],
        },
        Section {
            id: "features",
            heading: "Key Features and Benefits".to_string(),
            blocks: vec![
                Block::Subsection {
                    heading: "Key Features".to_string(),
                    blocks: vec![Block::Bullets(vec![
                        labeled("Advanced Analytics", "Detailed insight into your business performance"),
                        labeled("User-Friendly Interface", "Intuitive design that needs minimal training"),
                        labeled("Integration Capabilities", "Connects with the tools you already use"),
                        labeled("Scalable Architecture", "Grows with your business needs"),
                        labeled("24/7 Support", "Round-the-clock customer assistance"),
                    ])],
                },
                Block::Subsection {
                    heading: "Business Benefits".to_string(),
                    blocks: vec![Block::Bullets(vec![
                        plain("Less time spent on repetitive manual work"),
                        plain("One source of truth shared by every team"),
                        plain("Faster, data-driven decisions"),
                        plain("Lower operating costs as you scale"),
                    ])],
                },
                Block::CallToAction(cta.clone()),
            ],
        },
        Section {
            id: "pricing",
            heading: "Pricing and Plans".to_string(),
            blocks: vec![
                Block::Paragraph(format!(
                    "Most {} solutions offer tiered pricing to accommodate different business sizes:",
                    category_lower
                )),
                Block::PricingTable(
                    PRICING_TIERS
                        .iter()
                        .map(|&(name, monthly_usd, best_for)| PricingTier {
                            name,
                            monthly_usd,
                            best_for,
                        })
                        .collect(),
                ),
                Block::Paragraph(
                    "Annual billing typically saves 15-20%, and most vendors offer a 14-30 day free trial."
                        .to_string(),
                ),
            ],
        },
        Section {
            id: "comparison",
            heading: "Pros and Cons Compared to Competitors".to_string(),
            blocks: vec![
                Block::Paragraph(format!(
                    "When considering {}, weigh the strengths against the alternatives on the market.",
                    title
                )),
                Block::ProsCons {
                    pros: vec![
                        "Comprehensive feature set".to_string(),
                        "Excellent customer support".to_string(),
                        "Regular updates and improvements".to_string(),
                        "Strong security measures".to_string(),
                    ],
                    cons: vec![
                        "Learning curve for new users".to_string(),
                        "Premium features require higher-tier plans".to_string(),
                        "Limited customization in basic plans".to_string(),
                    ],
                },
            ],
        },
        Section {
            id: "use-cases",
            heading: "Use Cases by Business Size".to_string(),
            blocks: vec![
                Block::Subsection {
                    heading: "Small Businesses".to_string(),
                    blocks: vec![Block::Bullets(vec![
                        plain("Streamlined workflows"),
                        plain("Cost-effective entry plans"),
                        plain("Quick implementation"),
                    ])],
                },
                Block::Subsection {
                    heading: "Mid-Size Companies".to_string(),
                    blocks: vec![Block::Bullets(vec![
                        plain("Cross-team collaboration"),
                        plain("Automation of recurring processes"),
                        plain("Reporting for department leads"),
                    ])],
                },
                Block::Subsection {
                    heading: "Enterprises".to_string(),
                    blocks: vec![Block::Bullets(vec![
                        plain("Advanced reporting capabilities"),
                        plain("Enhanced security and compliance features"),
                        plain("Custom integrations and dedicated support"),
                    ])],
                },
            ],
        },
        Section {
            id: "implementation",
            heading: "Implementation Plan".to_string(),
            blocks: vec![Block::Steps(vec![
                labeled(
                    "Assess your needs",
                    format!("List the {} workflows you want to improve and who owns them.", category_lower),
                ),
                labeled("Start a free trial", format!("Shortlist two or three vendors, starting with {}.", primary)),
                labeled("Migrate and integrate", "Import your data and connect your existing tools."),
                labeled("Train and measure", "Onboard your team and track adoption and ROI monthly."),
            ])],
        },
        Section {
            id: "roi",
            heading: "Return on Investment".to_string(),
            blocks: vec![
                Block::Stats(vec![
                    Stat {
                        value: "30%",
                        label: "average productivity gain",
                    },
                    Stat {
                        value: "25%",
                        label: "reduction in operational costs",
                    },
                    Stat {
                        value: "3x",
                        label: "faster reporting",
                    },
                    Stat {
                        value: "6 months",
                        label: "typical payback period",
                    },
                ]),
                Block::Paragraph(format!(
                    "Businesses that adopt the right {} tool typically recover their investment within the first \
                     two quarters.",
                    category_lower
                )),
            ],
        },
        Section {
            id: "verdict",
            heading: "Final Verdict".to_string(),
            blocks: vec![
                Block::Paragraph(format!(
                    "{} stands out as a leading choice in the {} category. With a robust feature set, competitive \
                     pricing and excellent support, it is an excellent choice for businesses looking to improve \
                     their operations.",
                    title, category
                )),
                Block::CallToAction(cta),
            ],
        },
    ];

    if !input.tags.is_empty() {
        sections.push(Section {
            id: "related",
            heading: "Related Topics".to_string(),
            blocks: vec![Block::Bullets(
                input.tags.iter().map(|t| plain(t.clone())).collect(),
            )],
        });
    }

    ArticleDocument {
        title: title.to_string(),
        sections,
    }
}

/// Render a document as an HTML `<article>`
pub fn render_document(doc: &ArticleDocument) -> String {
    html! {
        article class="saas-review" {
            h1 { (doc.title) }
            @for part in &doc.sections {
                section id=(part.id) {
                    h2 { (part.heading) }
                    @for block in &part.blocks {
                        (render_block(block))
                    }
                }
            }
        }
    }
    .into_string()
}

/// Render a standalone call-to-action box (appended to remote bodies)
pub fn render_call_to_action(cta: &CallToAction) -> String {
    cta_markup(cta).into_string()
}

fn render_block(block: &Block) -> Markup {
    match block {
        Block::Paragraph(text) => html! { p { (text) } },
        Block::Bullets(items) => html! {
            ul {
                @for item in items {
                    li { (list_item(item)) }
                }
            }
        },
        Block::Steps(items) => html! {
            ol class="steps" {
                @for item in items {
                    li { (list_item(item)) }
                }
            }
        },
        Block::PricingTable(tiers) => html! {
            table class="pricing-table" {
                thead {
                    tr {
                        th { "Plan" }
                        th { "Price" }
                        th { "Best for" }
                    }
                }
                tbody {
                    @for tier in tiers {
                        tr {
                            td { (tier.name) }
                            td { "$" (tier.monthly_usd) "/month" }
                            td { (tier.best_for) }
                        }
                    }
                }
            }
        },
        Block::ProsCons { pros, cons } => html! {
            div class="pros-cons" {
                div class="pros" {
                    h3 { "Pros" }
                    ul {
                        @for pro in pros {
                            li { (pro) }
                        }
                    }
                }
                div class="cons" {
                    h3 { "Cons" }
                    ul {
                        @for con in cons {
                            li { (con) }
                        }
                    }
                }
            }
        },
        Block::Stats(stats) => html! {
            div class="roi-stats" {
                @for stat in stats {
                    div class="stat" {
                        span class="stat-value" { (stat.value) }
                        " "
                        span class="stat-label" { (stat.label) }
                    }
                }
            }
        },
        Block::CallToAction(cta) => cta_markup(cta),
        Block::Subsection { heading, blocks } => html! {
            div class="subsection" {
                h3 { (heading) }
                @for inner in blocks {
                    (render_block(inner))
                }
            }
        },
    }
}

fn list_item(item: &ListItem) -> Markup {
    html! {
        @if let Some(label) = &item.label {
            strong { (label) } ": "
        }
        (item.text)
    }
}

fn cta_markup(cta: &CallToAction) -> Markup {
    html! {
        div class="affiliate-cta" {
            p class="cta-text" { (cta.text) }
            @for (i, link) in cta.links.iter().enumerate() {
                @let button_class = if i == 0 { "cta-button primary" } else { "cta-button secondary" };
                a class=(button_class)
                    href=(link.url)
                    rel="nofollow sponsored noopener"
                    target="_blank" {
                    "Try " (link.name)
                }
            }
        }
    }
}

/// Template excerpt (fixed shape, not derived from the body)
pub fn template_excerpt(title: &str, category: &str) -> String {
    format!(
        "Discover everything you need to know about {} in our comprehensive review of the best {} options. \
         We cover features, pricing, alternatives, and help you make the right choice for your business.",
        title,
        category.to_lowercase()
    )
}

/// Template meta description
pub fn template_meta_description(title: &str, category: &str) -> String {
    format!(
        "Comprehensive review of {} - features, pricing, pros & cons. Find the best {} solution for your business needs.",
        title,
        category.to_lowercase()
    )
}

/// Full template path: body, excerpt and meta description
pub fn render_template_article(input: &TemplateInput<'_>) -> TemplateOutput {
    let document = build_document(input);
    TemplateOutput {
        body: render_document(&document),
        excerpt: template_excerpt(input.title, input.category),
        meta_description: template_meta_description(input.title, input.category),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::affiliate::AffiliateCatalog;

    /// Checks that every opening tag has a matching closing tag in order
    pub(crate) fn tags_balanced(html: &str) -> bool {
        let mut stack: Vec<String> = Vec::new();
        let mut rest = html;
        while let Some(start) = rest.find('<') {
            let Some(end) = rest[start..].find('>') else {
                return false;
            };
            let tag = &rest[start + 1..start + end];
            rest = &rest[start + end + 1..];
            if let Some(name) = tag.strip_prefix('/') {
                if stack.pop().as_deref() != Some(name.trim()) {
                    return false;
                }
            } else {
                let name = tag.split_whitespace().next().unwrap_or_default();
                stack.push(name.to_string());
            }
        }
        stack.is_empty()
    }

    fn render(title: &str, category: &str, tags: &[String]) -> TemplateOutput {
        let catalog = AffiliateCatalog::builtin().unwrap();
        let input = TemplateInput {
            title,
            category,
            tags,
            affiliate: catalog.resolve(category),
        };
        render_template_article(&input)
    }

    #[test]
    fn test_body_embeds_title_and_crm_links() {
        let out = render("Best CRM Software for Small Business 2025", "CRM Software", &[]);
        assert!(out.body.contains("Best CRM Software for Small Business 2025"));
        assert!(out.body.contains("hubspot.com"));
        assert!(out.body.contains("Start your free HubSpot CRM account"));
    }

    #[test]
    fn test_markup_is_balanced() {
        let tags = vec!["crm".to_string(), "sales".to_string()];
        let out = render("Best <CRM> & \"Sales\" Tools", "CRM Software", &tags);
        assert!(tags_balanced(&out.body), "unbalanced markup: {}", out.body);
        assert!(out.body.contains("Best &lt;CRM&gt; &amp;"));
    }

    #[test]
    fn test_section_order() {
        let out = render("Notion", "Productivity Apps", &["notes".to_string()]);
        let ids = [
            "introduction",
            "definition",
            "features",
            "pricing",
            "comparison",
            "use-cases",
            "implementation",
            "roi",
            "verdict",
            "related",
        ];
        let positions: Vec<usize> = ids
            .iter()
            .map(|id| out.body.find(&format!("id=\"{}\"", id)).expect(id))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_pricing_table_has_fixed_tiers() {
        let out = render("Asana", "Project Management", &[]);
        assert!(out.body.contains("$29/month"));
        assert!(out.body.contains("$79/month"));
        assert!(out.body.contains("$199/month"));
    }

    #[test]
    fn test_four_step_plan() {
        let doc = build_document(&TemplateInput {
            title: "x",
            category: "y",
            tags: &[],
            affiliate: AffiliateCatalog::builtin().unwrap().default_entry(),
        });
        let plan = doc.sections.iter().find(|s| s.id == "implementation").unwrap();
        match &plan.blocks[0] {
            Block::Steps(steps) => assert_eq!(steps.len(), 4),
            other => panic!("unexpected block {:?}", other),
        }
    }

    #[test]
    fn test_no_related_section_without_tags() {
        let out = render("Asana", "Project Management", &[]);
        assert!(!out.body.contains("id=\"related\""));
    }

    #[test]
    fn test_deterministic() {
        let a = render("Zoom", "Communication Tools", &[]);
        let b = render("Zoom", "Communication Tools", &[]);
        assert_eq!(a.body, b.body);
        assert_eq!(a.excerpt, b.excerpt);
    }

    #[test]
    fn test_excerpt_and_meta_shape() {
        let out = render("Semrush", "SEO Tools", &[]);
        assert!(out.excerpt.starts_with("Discover everything you need to know about Semrush"));
        assert!(out.excerpt.contains("seo tools"));
        assert!(out.meta_description.starts_with("Comprehensive review of Semrush"));
    }

    #[test]
    fn test_unmapped_category_uses_default_cta() {
        let catalog = AffiliateCatalog::builtin().unwrap();
        let out = render("Widgets", "Underwater Basket Weaving", &[]);
        assert!(out.body.contains(&catalog.default_entry().primary_url));
    }

    #[test]
    fn test_balance_checker_detects_problems() {
        assert!(tags_balanced("<p><b>x</b></p>"));
        assert!(!tags_balanced("<p><b>x</p></b>"));
        assert!(!tags_balanced("<p>x"));
    }
}
