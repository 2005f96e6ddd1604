//! Multi-strategy resolution of form elements from semantic field
//! descriptors.
//!
//! Strategies are pure functions over document snapshots, which keeps the
//! matching logic testable without a browser. The [`FieldResolver`] drives
//! the ordered fallback chain against a live [`page_port::PagePort`], giving
//! each strategy its own polling budget before moving on.

mod normalize;
mod resolver;
mod strategies;
mod types;

pub use normalize::fold;
pub use resolver::{FieldResolver, ResolverOpts};
pub use strategies::{
    default_chain, AttributeKeywordStrategy, ContenteditableStrategy, LabelExactStrategy,
    LocateStrategy,
};
pub use types::{LocatorResult, LocatorStrategy, TargetKind};
