//! API groups of the CourtListener client.

mod audio;
mod citations;
mod clusters;
mod courts;
mod dockets;
mod opinions;
mod people;
mod search;

pub use audio::AudioApi;
pub use citations::{CitationsApi, BATCH_TIMEOUT, MAX_BATCH};
pub use clusters::ClustersApi;
pub use courts::{is_court_id, CourtsApi};
pub use dockets::DocketsApi;
pub use opinions::OpinionsApi;
pub use people::PeopleApi;
pub use search::{
    AudioSearch, DocketSearch, OpinionSearch, PeopleSearch, RecapSearch, SearchApi,
    SemanticSearch, DEFAULT_LIMIT, DEFAULT_ORDER,
};
