use serde::Deserialize;

pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl Pagination {
    /// Limit in `1..=MAX_LIMIT`, offset never negative.
    pub fn clamped(self) -> Self {
        Self {
            limit: self.limit.clamp(1, MAX_LIMIT),
            offset: self.offset.max(0),
        }
    }

    /// Applies the window to an already ordered iterator.
    pub fn window<T>(self, items: impl Iterator<Item = T>) -> Vec<T> {
        let p = self.clamped();
        items.skip(p.offset as usize).take(p.limit as usize).collect()
    }
}
