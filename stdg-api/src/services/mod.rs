//! External clients and background services

pub mod auto_publisher;
pub mod llm_client;
pub mod mailing_list;

pub use auto_publisher::AutoPublisher;
pub use llm_client::{CompletionRequest, LlmError, OpenAiClient, TextGenerator};
pub use mailing_list::{MailchimpClient, MailingList, MailingListError};
