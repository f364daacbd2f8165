use halte::{directory::DirectoryCache, realtime::Pass};
use tokio::sync::RwLock;

use crate::client::OvClient;

/// Latest polled departure board: a complete, time-ordered pass list or the
/// error that kept us from producing one. Never a partial list.
pub type Board = Result<Vec<Pass>, String>;

pub struct AppState {
    pub cache: DirectoryCache,
    pub client: OvClient,
    pub board: RwLock<Option<Board>>,
}

impl AppState {
    pub fn new(cache: DirectoryCache, client: OvClient) -> Self {
        Self {
            cache,
            client,
            board: RwLock::new(None),
        }
    }
}
