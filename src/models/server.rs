// src/models/server.rs
use serde::{Deserialize, Serialize};

/// One running game instance as listed by the games API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub playing: Option<u32>,
}

impl ServerRecord {
    /// Servers without an id or a reported player count never qualify.
    pub fn is_suitable(&self, max_players: u32) -> bool {
        self.id.is_some() && matches!(self.playing, Some(playing) if playing <= max_players)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerPage {
    #[serde(default)]
    pub data: Vec<ServerRecord>,
    #[serde(default, rename = "nextPageCursor")]
    pub next_page_cursor: Option<String>,
}

impl ServerPage {
    /// The cursor for the following page, if the listing continues.
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_page_cursor.as_deref().filter(|c| !c.is_empty())
    }
}
