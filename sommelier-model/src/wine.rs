use crate::ids::WineId;

/// A wine matched from a scanned list (or restored from the offline cache).
///
/// The scan lifecycle treats this as an atomic unit: it is produced by the
/// matching service, stored and replayed by the offline cache, and handed to
/// renderers untouched.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WineResult {
    pub id: WineId,
    pub name: String,
    pub producer: Option<String>,
    pub vintage: Option<u16>,
    pub region: Option<String>,
    /// Price exactly as printed on the list.
    pub list_price: Option<String>,
    /// Confidence of the database match in `0.0..=1.0`.
    pub match_score: f32,
}

impl WineResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: WineId::new(),
            name: name.into(),
            producer: None,
            vintage: None,
            region: None,
            list_price: None,
            match_score: 0.0,
        }
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn with_vintage(mut self, vintage: u16) -> Self {
        self.vintage = Some(vintage);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_list_price(mut self, price: impl Into<String>) -> Self {
        self.list_price = Some(price.into());
        self
    }

    pub fn with_match_score(mut self, score: f32) -> Self {
        self.match_score = score.clamp(0.0, 1.0);
        self
    }
}
