pub mod alignment;
pub mod checker;
pub mod classifier;
pub mod config;
pub mod dkim;
pub mod dmarc;
pub mod dns;
pub mod domain_utils;
pub mod error;
pub mod policy;
pub mod report;
pub mod verdict;

pub use alignment::{check_alignment, AlignmentMode, AlignmentResult};
pub use checker::{BatchEntry, BatchOutcome, CheckOptions, SpoofChecker, SpoofReport};
pub use classifier::{classify, Classification, ClassificationVerdict};
pub use config::Config;
pub use dkim::{DkimAssessment, DkimStatus};
pub use dmarc::{DmarcFields, EffectivePolicy};
pub use dns::{HickoryTxtResolver, RecordFetcher, RecordKind, RecordLookup, TxtAnswer, TxtResolver};
pub use domain_utils::DomainUtils;
pub use error::SpoofCheckError;
pub use policy::{resolve_policy, DmarcPolicy, PolicyDisposition};
pub use verdict::VerdictSummary;
