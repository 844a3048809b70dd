//! Search result translation.
//!
//! Converts raw `ldap3` search entries into [`DirectoryRecord`]s: a typed
//! attribute mapping in which three reserved binary attributes are decoded
//! into consumable forms and everything else passes through as delivered.

use std::collections::HashMap;

use ldap3::SearchEntry;
use serde::{Deserialize, Serialize};

use crate::error::DirectoryResult;
use crate::guid::format_guid;

/// Attribute carrying the 16-byte Active Directory object identifier.
pub const ATTR_OBJECT_GUID: &str = "objectGUID";

/// Attribute carrying the thumbnail photo image payload.
pub const ATTR_THUMBNAIL_PHOTO: &str = "thumbnailPhoto";

/// Attribute carrying the JPEG photo image payload.
pub const ATTR_JPEG_PHOTO: &str = "jpegPhoto";

/// A translated attribute value: text, a sequence of texts, or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// A single string value.
    Text(String),
    /// Multiple string values, in server-delivery order.
    TextList(Vec<String>),
    /// Raw binary data (a photo payload), byte-for-byte as delivered.
    Binary(Vec<u8>),
}

impl AttributeValue {
    /// Get as a string if this is a single text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get as strings (works for both single and multi-valued text).
    pub fn as_texts(&self) -> Vec<&str> {
        match self {
            AttributeValue::Text(s) => vec![s.as_str()],
            AttributeValue::TextList(list) => list.iter().map(String::as_str).collect(),
            AttributeValue::Binary(_) => vec![],
        }
    }

    /// Get as raw bytes if this is a binary value.
    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Text(s)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Text(s.to_string())
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(list: Vec<String>) -> Self {
        AttributeValue::TextList(list)
    }
}

impl From<Vec<u8>> for AttributeValue {
    fn from(bytes: Vec<u8>) -> Self {
        AttributeValue::Binary(bytes)
    }
}

/// One translated directory entry: a mapping from attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryRecord {
    #[serde(flatten)]
    attributes: HashMap<String, AttributeValue>,
}

impl DirectoryRecord {
    /// Translate one raw search entry.
    ///
    /// The entry's textual attributes form the record's base (single value →
    /// [`AttributeValue::Text`], multiple → [`AttributeValue::TextList`]),
    /// with the entry DN stored under `dn`. Binary attributes are then
    /// inspected by name:
    ///
    /// - `objectGUID`: the first raw value is reformatted into the canonical
    ///   hyphenated string, overwriting any same-named textual value (the
    ///   decoded form wins).
    /// - `thumbnailPhoto` / `jpegPhoto`: the first raw value is stored
    ///   verbatim.
    /// - anything else: ignored.
    ///
    /// An `objectGUID` value that is not exactly 16 bytes fails the whole
    /// translation.
    pub fn from_entry(entry: SearchEntry) -> DirectoryResult<Self> {
        let mut attributes = HashMap::new();

        attributes.insert("dn".to_string(), AttributeValue::Text(entry.dn));

        for (name, values) in entry.attrs {
            let value = match values.len() {
                0 => continue,
                1 => {
                    let mut values = values;
                    AttributeValue::Text(values.pop().unwrap_or_default())
                }
                _ => AttributeValue::TextList(values),
            };
            attributes.insert(name, value);
        }

        for (name, values) in entry.bin_attrs {
            if let Some(first) = values.into_iter().next() {
                match name.as_str() {
                    ATTR_OBJECT_GUID => {
                        attributes.insert(name, AttributeValue::Text(format_guid(&first)?));
                    }
                    ATTR_THUMBNAIL_PHOTO | ATTR_JPEG_PHOTO => {
                        attributes.insert(name, AttributeValue::Binary(first));
                    }
                    _ => {}
                }
            }
        }

        Ok(Self { attributes })
    }

    /// Get an attribute value.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Get a single-valued text attribute.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttributeValue::as_text)
    }

    /// Get a binary attribute.
    pub fn get_binary(&self, name: &str) -> Option<&[u8]> {
        self.get(name).and_then(AttributeValue::as_binary)
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> Option<&str> {
        self.get_text("dn")
    }

    /// The decoded objectGUID in canonical hyphenated form, if present.
    pub fn object_guid(&self) -> Option<&str> {
        self.get_text(ATTR_OBJECT_GUID)
    }

    /// The raw thumbnail photo payload, if present.
    pub fn thumbnail_photo(&self) -> Option<&[u8]> {
        self.get_binary(ATTR_THUMBNAIL_PHOTO)
    }

    /// The raw JPEG photo payload, if present.
    pub fn jpeg_photo(&self) -> Option<&[u8]> {
        self.get_binary(ATTR_JPEG_PHOTO)
    }

    /// Check if an attribute exists.
    pub fn has(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Get the number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the record is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.attributes.iter()
    }

    /// Convert to a plain map.
    pub fn into_map(self) -> HashMap<String, AttributeValue> {
        self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        dn: &str,
        attrs: Vec<(&str, Vec<&str>)>,
        bin_attrs: Vec<(&str, Vec<Vec<u8>>)>,
    ) -> SearchEntry {
        SearchEntry {
            dn: dn.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(k, vs)| (k.to_string(), vs.into_iter().map(String::from).collect()))
                .collect(),
            bin_attrs: bin_attrs
                .into_iter()
                .map(|(k, vs)| (k.to_string(), vs))
                .collect(),
        }
    }

    #[test]
    fn test_scalar_attributes_pass_through() {
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![("cn", vec!["jdoe"]), ("sn", vec!["Doe"])],
            vec![],
        ))
        .unwrap();

        assert_eq!(record.dn(), Some("cn=jdoe,dc=example,dc=com"));
        assert_eq!(record.get_text("cn"), Some("jdoe"));
        assert_eq!(record.get_text("sn"), Some("Doe"));
    }

    #[test]
    fn test_multi_valued_attributes_keep_order() {
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![("mail", vec!["jdoe@example.com", "john@example.com"])],
            vec![],
        ))
        .unwrap();

        assert_eq!(
            record.get("mail"),
            Some(&AttributeValue::TextList(vec![
                "jdoe@example.com".to_string(),
                "john@example.com".to_string()
            ]))
        );
        assert_eq!(
            record.get("mail").unwrap().as_texts(),
            vec!["jdoe@example.com", "john@example.com"]
        );
    }

    #[test]
    fn test_object_guid_is_decoded() {
        let raw = vec![
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e,
            0x0f, 0x10,
        ];
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![],
            vec![(ATTR_OBJECT_GUID, vec![raw])],
        ))
        .unwrap();

        assert_eq!(
            record.object_guid(),
            Some("04030201-0605-0807-090a-0b0c0d0e0f10")
        );
        // Never left as raw bytes.
        assert!(record.get_binary(ATTR_OBJECT_GUID).is_none());
    }

    #[test]
    fn test_decoded_guid_overwrites_scalar() {
        // Some servers also deliver objectGUID as a (mangled) string value;
        // the decoded binary form must win.
        let raw = vec![0u8; 16];
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![(ATTR_OBJECT_GUID, vec!["garbage"])],
            vec![(ATTR_OBJECT_GUID, vec![raw])],
        ))
        .unwrap();

        assert_eq!(
            record.object_guid(),
            Some("00000000-0000-0000-0000-000000000000")
        );
    }

    #[test]
    fn test_photos_are_byte_identical() {
        let thumb = vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
        let jpeg = vec![0xff, 0xd8, 0xff, 0xdb, 0x12, 0x34];
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![],
            vec![
                (ATTR_THUMBNAIL_PHOTO, vec![thumb.clone(), vec![0x00]]),
                (ATTR_JPEG_PHOTO, vec![jpeg.clone()]),
            ],
        ))
        .unwrap();

        // Only the first raw value is taken, verbatim.
        assert_eq!(record.thumbnail_photo(), Some(thumb.as_slice()));
        assert_eq!(record.jpeg_photo(), Some(jpeg.as_slice()));
    }

    #[test]
    fn test_other_binary_attributes_are_ignored() {
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![("cn", vec!["jdoe"])],
            vec![("objectSid", vec![vec![0x01, 0x05]])],
        ))
        .unwrap();

        assert!(!record.has("objectSid"));
        assert_eq!(record.get_text("cn"), Some("jdoe"));
    }

    #[test]
    fn test_malformed_guid_fails_translation() {
        let result = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![],
            vec![(ATTR_OBJECT_GUID, vec![vec![0u8; 15]])],
        ));

        assert!(matches!(
            result,
            Err(crate::error::DirectoryError::InvalidGuid { length: 15 })
        ));
    }

    #[test]
    fn test_record_serialization() {
        let record = DirectoryRecord::from_entry(entry(
            "cn=jdoe,dc=example,dc=com",
            vec![("cn", vec!["jdoe"])],
            vec![],
        ))
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["cn"], "jdoe");
        assert_eq!(json["dn"], "cn=jdoe,dc=example,dc=com");
    }
}
