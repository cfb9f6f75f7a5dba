pub mod channel;
pub mod fetch;
pub mod history;
pub mod storage;
pub mod summarizer;
pub mod summary;
pub mod transcript;

pub use channel::*;
pub use fetch::*;
pub use history::*;
pub use storage::*;
pub use summarizer::*;
pub use summary::*;
pub use transcript::*;
