use serde::{Deserialize, Serialize};

/// A thumbnail record from the `asvz_images` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    #[serde(rename = "collectionId", default)]
    pub collection_id: String,
    pub asvz_id: String,
    /// Stored file name; empty when the upload kept the default name
    #[serde(default)]
    pub img: Option<String>,
}

impl ImageRecord {
    /// The stored file name, or `fallback` when none was recorded.
    pub fn filename<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.img
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_fallback() {
        let mut record = ImageRecord {
            id: "r1".into(),
            collection_id: "c1".into(),
            asvz_id: "100".into(),
            img: Some("thumb_abc.jpg".into()),
        };
        assert_eq!(record.filename("100.jpg"), "thumb_abc.jpg");

        record.img = Some(String::new());
        assert_eq!(record.filename("100.jpg"), "100.jpg");

        record.img = None;
        assert_eq!(record.filename("100.jpg"), "100.jpg");
    }
}
