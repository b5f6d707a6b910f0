pub mod checker;
pub mod crawler;
pub mod error;
pub mod exclusions;
pub mod filter;
pub mod model;
pub mod output;

pub use checker::SecurityChecker;
pub use crawler::{Crawler, HttpCrawler};
pub use error::{Error, Result};
pub use exclusions::ExclusionSet;
pub use filter::apply_exclusions;
pub use model::{Advisory, PackageFinding, VulnerabilityReport};
