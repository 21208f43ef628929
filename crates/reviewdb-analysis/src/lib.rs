//! Review analysis for reviewdb.
//!
//! Detects each review's language, reduces it to lemmas with that language's
//! lexicon, scores sentiment through a pretrained star-rating classifier and
//! assigns every review a dominant LDA topic fitted over the whole batch.

pub mod classifier;
pub mod cleaner;
pub mod error;
pub mod lda;
pub mod lexicon;
pub mod pipeline;
pub mod sentiment;
pub mod topic;
pub mod types;
pub mod vectorize;

pub use classifier::{HttpClassifier, TextClassifier};
pub use cleaner::LocalizedCleaner;
pub use error::{AnalysisError, ClassifierError, LexiconError};
pub use pipeline::Pipeline;
pub use sentiment::{rating_to_label, SentimentAdapter};
pub use topic::{PreparedCorpus, TopicModel, TopicModelConfig, TopicModelOutput};
pub use types::{
    AnalyzedBatch, Batch, Document, SentimentLabel, SentimentResult, StarRating, Topic,
};
