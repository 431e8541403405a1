/// One page of a listing.
///
/// `count` is only present on first-page responses; callers of later pages
/// remember the count from the first response.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page<T> {
    pub data: Vec<T>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub count: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, count: Option<u64>) -> Self {
        Self { data, count }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
