//! Persisted record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Author recorded on every article
pub const DEFAULT_AUTHOR: &str = "SaaS Tools Team";

/// Upper bound of a tool rating (lower bound is 0)
pub const MAX_RATING: f64 = 5.0;

/// Partner link embedded in an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub name: String,
    pub url: String,
}

/// Blog article
///
/// `slug` is unique across the table. `view_count` only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    /// HTML or Markdown body
    pub content: String,
    pub excerpt: String,
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub featured_image: Option<String>,
    pub published: bool,
    pub featured: bool,
    pub view_count: i64,
    pub affiliate_links: Vec<AffiliateLink>,
    pub seo_score: i64,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// New published article with a fresh id and current timestamps
    pub fn new(title: impl Into<String>, slug: impl Into<String>, category: impl Into<String>) -> Self {
        let now = crate::time::now();
        let title = title.into();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            meta_title: title.clone(),
            title,
            slug: slug.into(),
            content: String::new(),
            excerpt: String::new(),
            meta_description: String::new(),
            keywords: Vec::new(),
            category: category.into(),
            tags: Vec::new(),
            author: DEFAULT_AUTHOR.to_string(),
            featured_image: None,
            published: true,
            featured: false,
            view_count: 0,
            affiliate_links: Vec::new(),
            seo_score: 0,
            published_at: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Pricing model of a listed tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingType {
    Free,
    Freemium,
    Paid,
    Subscription,
}

impl PricingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingType::Free => "free",
            PricingType::Freemium => "freemium",
            PricingType::Paid => "paid",
            PricingType::Subscription => "subscription",
        }
    }
}

impl fmt::Display for PricingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(PricingType::Free),
            "freemium" => Ok(PricingType::Freemium),
            "paid" => Ok(PricingType::Paid),
            "subscription" => Ok(PricingType::Subscription),
            other => Err(crate::Error::InvalidInput(format!(
                "Unknown pricing type: {}",
                other
            ))),
        }
    }
}

/// Listed SaaS tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: String,
    pub name: String,
    pub category: String,
    pub description: String,
    pub short_description: String,
    pub pricing_type: PricingType,
    pub pricing_details: Option<String>,
    pub starting_price: Option<f64>,
    pub features: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// 0.0 ..= 5.0
    pub rating: f64,
    pub affiliate_link: Option<String>,
    pub website_url: Option<String>,
    /// Generated review text
    pub review: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Newsletter sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsletterSubscription {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub subscribed_at: DateTime<Utc>,
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_article_defaults() {
        let article = Article::new("CRM Guide", "crm-guide", "CRM Software");
        assert_eq!(article.author, DEFAULT_AUTHOR);
        assert_eq!(article.meta_title, "CRM Guide");
        assert!(article.published);
        assert!(!article.featured);
        assert_eq!(article.view_count, 0);
        assert!(uuid::Uuid::parse_str(&article.id).is_ok());
    }

    #[test]
    fn test_pricing_type_parse() {
        assert_eq!("Freemium".parse::<PricingType>().unwrap(), PricingType::Freemium);
        assert_eq!(" paid ".parse::<PricingType>().unwrap(), PricingType::Paid);
        assert!("lifetime".parse::<PricingType>().is_err());
    }

    #[test]
    fn test_pricing_type_serde_lowercase() {
        let json = serde_json::to_string(&PricingType::Subscription).unwrap();
        assert_eq!(json, "\"subscription\"");
    }
}
