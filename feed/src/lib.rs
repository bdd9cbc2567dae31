pub mod driver;
pub mod error;
pub mod history;
pub mod model;
pub mod pager;
pub mod recommend;
pub mod scroll;
pub mod source;
pub mod store;
pub mod text;
pub mod volume;

pub use driver::Feed;
pub use error::{FeedError, FeedResult};
pub use history::{HistoryRecord, HistoryStore, SearchHistory, ViewedBook, ViewedHistory};
pub use model::{CatalogItem, CatalogQuery, Category, PageKey, SessionKey, SortMode, PAGE_SIZE, RECOMMENDATION_LIMIT};
pub use pager::{FeedSnapshot, FeedState, LoadStep, Pager};
pub use source::CatalogSource;
pub use store::{KvStore, MemoryStore, SledStore};
pub use volume::{RawVolume, VolumeList};
