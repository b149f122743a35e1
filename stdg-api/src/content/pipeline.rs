//! Content generation pipeline
//!
//! The pipeline is built with an optional [`TextGenerator`]. With one it tries
//! the remote path first; without one, or whenever the remote path fails, it
//! renders the template. Callers always get a complete [`GeneratedContent`].

use serde::Serialize;
use std::sync::Arc;
use stdg_common::db::{AffiliateLink, Article};
use stdg_common::slug::slugify;
use tracing::{info, warn};

use super::affiliate::{AffiliateCatalog, AffiliateEntry};
use super::seo::{seo_score, TEMPLATE_SEO_SCORE};
use super::template::{self, TemplateInput};
use super::topics;
use crate::services::llm_client::{CompletionRequest, LlmError, TextGenerator};

/// Default article length requested from the remote generator
pub const DEFAULT_TARGET_WORDS: u32 = 2500;

/// Remote excerpts are the first this-many characters of the body
pub const EXCERPT_CHARS: usize = 200;

/// Upper bound for meta descriptions
pub const META_DESCRIPTION_CHARS: usize = 160;

const ARTICLE_SYSTEM_PROMPT: &str = "You are an expert SaaS review writer and digital marketing specialist. \
Write comprehensive, SEO-optimized articles that help businesses make informed software decisions.";

const META_SYSTEM_PROMPT: &str = "You are an SEO expert specializing in meta descriptions.";

const REVIEW_SYSTEM_PROMPT: &str = "You are a concise, fair SaaS product reviewer.";

const ARTICLE_MAX_TOKENS: u32 = 4000;
const ARTICLE_TEMPERATURE: f32 = 0.7;
const META_MAX_TOKENS: u32 = 100;
const META_TEMPERATURE: f32 = 0.5;
const REVIEW_MAX_TOKENS: u32 = 300;
const REVIEW_TEMPERATURE: f32 = 0.7;

/// What to write about
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub title: String,
    pub category: String,
    pub keywords: Vec<String>,
    pub tags: Vec<String>,
    pub target_words: u32,
}

impl GenerationRequest {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            keywords: Vec::new(),
            tags: Vec::new(),
            target_words: DEFAULT_TARGET_WORDS,
        }
    }

    /// Request for an automatically chosen topic (keywords, category and tags derived)
    pub fn for_topic(topic: &str) -> Self {
        let keywords = topics::keywords_for_topic(topic);
        let tags = topics::tags_from_keywords(&keywords);
        Self::new(topic, topics::category_for_topic(topic))
            .with_keywords(keywords)
            .with_tags(tags)
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_target_words(mut self, target_words: u32) -> Self {
        self.target_words = target_words;
        self
    }

    /// Primary keyword: first listed keyword, else the lower-cased title
    fn primary_keyword(&self) -> String {
        self.keywords
            .first()
            .cloned()
            .unwrap_or_else(|| self.title.to_lowercase())
    }
}

/// Which path produced the content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Remote,
    Template,
}

/// Pipeline output
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub body: String,
    pub excerpt: String,
    pub meta_description: String,
    pub seo_score: i64,
    pub affiliate_links: Vec<AffiliateLink>,
    pub source: ContentSource,
}

impl GeneratedContent {
    /// New published article for `request`, slug derived from the title
    pub fn into_article(self, request: &GenerationRequest) -> Article {
        let mut article = Article::new(
            request.title.clone(),
            slugify(&request.title),
            request.category.clone(),
        );
        article.content = self.body;
        article.excerpt = self.excerpt;
        article.meta_description = self.meta_description;
        article.keywords = request.keywords.clone();
        article.tags = request.tags.clone();
        article.affiliate_links = self.affiliate_links;
        article.seo_score = self.seo_score;
        article
    }
}

pub struct ContentPipeline {
    generator: Option<Arc<dyn TextGenerator>>,
    catalog: Arc<AffiliateCatalog>,
}

impl ContentPipeline {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>, catalog: Arc<AffiliateCatalog>) -> Self {
        Self { generator, catalog }
    }

    /// Template-only pipeline
    pub fn template_only(catalog: Arc<AffiliateCatalog>) -> Self {
        Self::new(None, catalog)
    }

    pub fn remote_enabled(&self) -> bool {
        self.generator.is_some()
    }

    pub fn catalog(&self) -> &AffiliateCatalog {
        &self.catalog
    }

    /// Generate an article; never fails
    pub async fn generate(&self, request: &GenerationRequest) -> GeneratedContent {
        let affiliate = self.catalog.resolve(&request.category);

        if let Some(generator) = &self.generator {
            match generate_remote(generator.as_ref(), request, affiliate).await {
                Ok(content) => {
                    info!(
                        title = %request.title,
                        model = generator.model(),
                        seo_score = content.seo_score,
                        "Generated article remotely"
                    );
                    return content;
                }
                Err(e) => {
                    warn!(
                        title = %request.title,
                        error = %e,
                        "Remote generation failed, using template"
                    );
                }
            }
        }

        generate_from_template(request, affiliate)
    }

    /// Short review for a tool listing; falls back to a static sentence
    pub async fn tool_review(&self, name: &str, category: &str, description: &str) -> String {
        let Some(generator) = &self.generator else {
            return fallback_tool_review(name, category);
        };

        let prompt = format!(
            "Write a short, balanced review (under 150 words) of the SaaS tool \"{}\" in the {} category. \
             Product description: {}",
            name, category, description
        );
        let request = CompletionRequest::new(REVIEW_SYSTEM_PROMPT, prompt)
            .max_tokens(REVIEW_MAX_TOKENS)
            .temperature(REVIEW_TEMPERATURE);

        match generator.complete(request).await {
            Ok(review) => review,
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool review generation failed, using fallback");
                fallback_tool_review(name, category)
            }
        }
    }
}

async fn generate_remote(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
    affiliate: &AffiliateEntry,
) -> Result<GeneratedContent, LlmError> {
    let primary = request.primary_keyword();

    let article_request = CompletionRequest::new(ARTICLE_SYSTEM_PROMPT, article_prompt(request, &primary))
        .max_tokens(ARTICLE_MAX_TOKENS)
        .temperature(ARTICLE_TEMPERATURE);
    let generated = generator.complete(article_request).await?;

    let meta_prompt = format!(
        "Write a compelling 150-160 character meta description for an article about '{}' that includes \
         the keyword '{}' and encourages clicks.",
        request.title, primary
    );
    let meta_request = CompletionRequest::new(META_SYSTEM_PROMPT, meta_prompt)
        .max_tokens(META_MAX_TOKENS)
        .temperature(META_TEMPERATURE);
    let meta = generator.complete(meta_request).await?;

    let seo = seo_score(&generated, &request.keywords);
    let excerpt = excerpt_from_body(&generated);

    let cta = template::call_to_action(affiliate);
    let body = format!("{}\n\n{}", generated, template::render_call_to_action(&cta));

    Ok(GeneratedContent {
        body,
        excerpt,
        meta_description: truncate_chars(meta.trim(), META_DESCRIPTION_CHARS),
        seo_score: seo,
        affiliate_links: cta.links,
        source: ContentSource::Remote,
    })
}

fn generate_from_template(request: &GenerationRequest, affiliate: &AffiliateEntry) -> GeneratedContent {
    let output = template::render_template_article(&TemplateInput {
        title: &request.title,
        category: &request.category,
        tags: &request.tags,
        affiliate,
    });

    GeneratedContent {
        body: output.body,
        excerpt: output.excerpt,
        meta_description: output.meta_description,
        seo_score: TEMPLATE_SEO_SCORE,
        affiliate_links: affiliate.links(),
        source: ContentSource::Template,
    }
}

fn article_prompt(request: &GenerationRequest, primary: &str) -> String {
    let secondary: Vec<&str> = request
        .keywords
        .iter()
        .skip(1)
        .take(4)
        .map(String::as_str)
        .collect();

    format!(
        "Write a comprehensive, SEO-optimized article about \"{title}\" in the {category} category.\n\
         Target length: {words} words.\n\n\
         Requirements:\n\
         1. Include the primary keyword \"{primary}\" and the related keywords: {secondary}\n\
         2. Use H2 and H3 headings\n\
         3. Include practical benefits, use cases and pricing information\n\
         4. Compare against competitors\n\
         5. Write in an authoritative, helpful tone\n\n\
         Article structure:\n\
         - Introduction\n\
         - Feature overview\n\
         - Pricing and plans\n\
         - Alternatives and comparisons\n\
         - Use cases and examples\n\
         - Pros and cons\n\
         - Final verdict and recommendations\n",
        title = request.title,
        category = request.category,
        words = request.target_words,
        primary = primary,
        secondary = secondary.join(", "),
    )
}

/// First [`EXCERPT_CHARS`] characters, with `...` appended when cut
pub fn excerpt_from_body(body: &str) -> String {
    if body.chars().count() > EXCERPT_CHARS {
        let mut excerpt: String = body.chars().take(EXCERPT_CHARS).collect();
        excerpt.push_str("...");
        excerpt
    } else {
        body.to_string()
    }
}

/// Cut to at most `max` characters (never splits a code point)
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

pub fn fallback_tool_review(name: &str, category: &str) -> String {
    format!(
        "{} is a powerful {} solution that helps businesses streamline their operations and improve productivity.",
        name,
        category.to_lowercase()
    )
}
