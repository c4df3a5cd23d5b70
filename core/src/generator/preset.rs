use super::*;

/// Deals a fixed layout, in order and without any occlusion or rotation.
///
/// The requested count is ignored; every round gets exactly the configured keys. Used to replay
/// known boards and to build specific end states.
#[derive(Clone, Debug, Default)]
pub struct PresetTileGenerator {
    keys: Vec<String>,
    ids: TileIdSource,
}

impl PresetTileGenerator {
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ids: TileIdSource::new(),
        }
    }
}

impl TileGenerator for PresetTileGenerator {
    fn generate(&mut self, _request: &GenerationRequest) -> Vec<Tile> {
        self.keys
            .iter()
            .map(|key| Tile::new(self.ids.next_id(), key.as_str()))
            .collect()
    }
}
