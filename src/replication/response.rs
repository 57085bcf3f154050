//! Decoding of replication responses.
//!
//! The server answers in its "named list" XML dialect: every value element
//! (`str`, `int`, `long`, `lst`, `arr`, ...) may carry a `name` attribute.
//!
//! ```xml
//! <response>
//!   <lst name="responseHeader"><int name="status">0</int><int name="QTime">1</int></lst>
//!   <long name="indexversion">1401508582278</long>
//!   <long name="generation">13</long>
//! </response>
//! ```
//!
//! Bodies are deserialized with quick-xml's serde support into a small
//! tree of named lists; element order is kept and unknown tags are skipped.
//! Decoding only checks structure. A parseable body whose header reports a
//! failure still decodes; the resolver owns status validation.

use serde::Deserialize;

use super::error::ReplicationError;
use super::status::{STATUS_ENTRY, ServerStatus};

pub(crate) const INDEX_VERSION_COMMAND: &str = "indexversion";
pub(crate) const FILE_LIST_COMMAND: &str = "filelist";

const HEADER_LIST: &str = "responseHeader";

/// One `name=value` pair of a response header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderEntry {
    pub name: String,
    pub value: String,
}

/// The `responseHeader` block common to every response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeader {
    entries: Vec<HeaderEntry>,
}

impl ResponseHeader {
    #[must_use]
    pub fn entries(&self) -> &[HeaderEntry] {
        &self.entries
    }

    /// Typed status decoded from the `status` entry.
    #[must_use]
    pub fn status(&self) -> ServerStatus {
        let code = self
            .entries
            .iter()
            .find(|entry| entry.name == STATUS_ENTRY)
            .map(|entry| entry.value.as_str());
        ServerStatus::from_code(code)
    }
}

/// Decoded `command=indexversion` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexVersionResponse {
    pub header: ResponseHeader,
    /// Every top-level `long` value, in document order.
    pub longs: Vec<HeaderEntry>,
}

impl IndexVersionResponse {
    /// Looks up a top-level `long` by name.
    #[must_use]
    pub fn long(&self, name: &str) -> Option<&str> {
        self.longs
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value.as_str())
    }
}

/// One file of the current index as advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFileDescriptor {
    pub name: String,
    /// Advertised size in bytes, verbatim.
    pub size: String,
}

/// A named `arr` of file entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub name: String,
    pub files: Vec<IndexFileDescriptor>,
}

/// Decoded `command=filelist` response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileListResponse {
    pub header: ResponseHeader,
    pub groups: Vec<FileGroup>,
}

impl FileListResponse {
    /// Finds a file group by name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&FileGroup> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// Decodes an `indexversion` body.
///
/// # Errors
///
/// Returns [`ReplicationError::Decode`] if the body is not well-formed XML.
pub fn decode_index_version(body: &str) -> Result<IndexVersionResponse, ReplicationError> {
    let document = parse_document(body, INDEX_VERSION_COMMAND)?;

    let longs = document
        .values
        .iter()
        .filter_map(|value| match value {
            Value::Long(scalar) => scalar.as_entry(),
            _ => None,
        })
        .collect();

    Ok(IndexVersionResponse {
        header: document.header(),
        longs,
    })
}

/// Decodes a `filelist` body.
///
/// # Errors
///
/// Returns [`ReplicationError::Decode`] if the body is not well-formed XML.
pub fn decode_file_list(body: &str) -> Result<FileListResponse, ReplicationError> {
    let document = parse_document(body, FILE_LIST_COMMAND)?;

    let groups = document
        .values
        .iter()
        .filter_map(|value| match value {
            Value::Arr(arr) => Some(FileGroup {
                name: arr.name.clone().unwrap_or_default(),
                files: arr
                    .values
                    .iter()
                    .filter_map(|entry| match entry {
                        Value::Lst(lst) => Some(lst.file_descriptor()),
                        _ => None,
                    })
                    .collect(),
            }),
            _ => None,
        })
        .collect();

    Ok(FileListResponse {
        header: document.header(),
        groups,
    })
}

fn parse_document(body: &str, command: &'static str) -> Result<NamedList, ReplicationError> {
    quick_xml::de::from_str(body).map_err(|e| ReplicationError::decode(command, e.to_string()))
}

/// A named-list container: the document root, an `lst` or an `arr`.
#[derive(Debug, Deserialize)]
struct NamedList {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "$value", default)]
    values: Vec<Value>,
}

/// One child element, selected by its tag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Value {
    Lst(NamedList),
    Arr(NamedList),
    Str(Scalar),
    Long(Scalar),
    Int(Scalar),
    Float(Scalar),
    Double(Scalar),
    Bool(Scalar),
    Date(Scalar),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Scalar {
    #[serde(rename = "@name")]
    name: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

impl Scalar {
    fn as_entry(&self) -> Option<HeaderEntry> {
        self.name.as_ref().map(|name| HeaderEntry {
            name: name.clone(),
            value: self.text.trim().to_string(),
        })
    }
}

impl Value {
    fn scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Str(scalar)
            | Self::Long(scalar)
            | Self::Int(scalar)
            | Self::Float(scalar)
            | Self::Double(scalar)
            | Self::Bool(scalar)
            | Self::Date(scalar) => Some(scalar),
            Self::Lst(_) | Self::Arr(_) | Self::Other => None,
        }
    }
}

impl NamedList {
    /// The `responseHeader` list, or the first `lst` when none is named so.
    fn header(&self) -> ResponseHeader {
        let lists = || {
            self.values.iter().filter_map(|value| match value {
                Value::Lst(lst) => Some(lst),
                _ => None,
            })
        };
        let header = lists()
            .find(|lst| lst.name.as_deref() == Some(HEADER_LIST))
            .or_else(|| lists().next());

        ResponseHeader {
            entries: header
                .map(|lst| {
                    lst.values
                        .iter()
                        .filter_map(Value::scalar)
                        .filter_map(Scalar::as_entry)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn scalar_named(&self, name: &str) -> Option<&Scalar> {
        self.values
            .iter()
            .filter_map(Value::scalar)
            .find(|scalar| scalar.name.as_deref() == Some(name))
    }

    /// A file entry: `name` falls back to the first `str`, `size` to the
    /// first `long`.
    fn file_descriptor(&self) -> IndexFileDescriptor {
        let first_str = || {
            self.values.iter().find_map(|value| match value {
                Value::Str(scalar) => Some(scalar),
                _ => None,
            })
        };
        let first_long = || {
            self.values.iter().find_map(|value| match value {
                Value::Long(scalar) => Some(scalar),
                _ => None,
            })
        };

        let name = self
            .scalar_named("name")
            .or_else(first_str)
            .map(|scalar| scalar.text.trim().to_string())
            .unwrap_or_default();
        let size = self
            .scalar_named("size")
            .or_else(first_long)
            .map(|scalar| scalar.text.trim().to_string())
            .unwrap_or_default();
        IndexFileDescriptor { name, size }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const VERSION_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<lst name="responseHeader"><int name="status">0</int><int name="QTime">0</int></lst>
<long name="indexversion">1401508582278</long>
<long name="generation">13</long>
</response>"#;

    const FILE_LIST_OK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<lst name="responseHeader"><int name="status">0</int><int name="QTime">1</int></lst>
<arr name="other"><lst><str name="name">schema.xml</str><long name="size">10</long></lst></arr>
<arr name="filelist">
  <lst><str name="name">segments_d</str><long name="size">245</long></lst>
  <lst><long name="size">4096</long><long name="checksum">99</long><str name="name">_8.fdt</str></lst>
</arr>
</response>"#;

    #[test]
    fn test_decode_index_version_fields() {
        let decoded = decode_index_version(VERSION_OK).unwrap();
        assert_eq!(decoded.long("indexversion"), Some("1401508582278"));
        assert_eq!(decoded.long("generation"), Some("13"));
        assert!(decoded.header.status().is_success());
    }

    #[test]
    fn test_decode_index_version_field_order_irrelevant() {
        let body = r#"<response><long name="generation">2</long><lst name="responseHeader"><int name="status">0</int></lst><long name="indexversion">9</long></response>"#;
        let decoded = decode_index_version(body).unwrap();
        assert_eq!(decoded.long("indexversion"), Some("9"));
        assert_eq!(decoded.long("generation"), Some("2"));
    }

    #[test]
    fn test_decode_failure_status_still_decodes() {
        let body = r#"<response><lst name="responseHeader"><int name="status">1</int></lst></response>"#;
        let decoded = decode_index_version(body).unwrap();
        assert_eq!(decoded.header.status(), ServerStatus::Failure("1".to_string()));
        assert!(decoded.long("indexversion").is_none());
    }

    #[test]
    fn test_decode_file_list_groups() {
        let decoded = decode_file_list(FILE_LIST_OK).unwrap();
        assert_eq!(decoded.groups.len(), 2);

        let files = &decoded.group("filelist").unwrap().files;
        assert_eq!(
            files,
            &vec![
                IndexFileDescriptor {
                    name: "segments_d".to_string(),
                    size: "245".to_string()
                },
                IndexFileDescriptor {
                    name: "_8.fdt".to_string(),
                    size: "4096".to_string()
                },
            ]
        );
        assert_eq!(decoded.group("other").unwrap().files[0].name, "schema.xml");
    }

    #[test]
    fn test_decode_header_entries() {
        let decoded = decode_file_list(FILE_LIST_OK).unwrap();
        let names: Vec<&str> = decoded
            .header
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["status", "QTime"]);
    }

    #[test]
    fn test_decode_unescapes_entities() {
        let body = r#"<response><arr name="filelist"><lst><str name="name">a&amp;b</str></lst></arr></response>"#;
        let decoded = decode_file_list(body).unwrap();
        assert_eq!(decoded.group("filelist").unwrap().files[0].name, "a&b");
    }

    #[test]
    fn test_decode_skips_unknown_elements() {
        let body = r#"<response>
<lst name="responseHeader"><int name="status">0</int><null name="error"/><bool name="partial">false</bool></lst>
<result numFound="0"><doc><str name="id">1</str></doc></result>
<long name="indexversion">7</long>
<long name="generation">1</long>
</response>"#;
        let decoded = decode_index_version(body).unwrap();
        assert_eq!(decoded.long("indexversion"), Some("7"));
        assert_eq!(decoded.long("generation"), Some("1"));
        let names: Vec<&str> = decoded
            .header
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["status", "partial"]);
    }

    #[test]
    fn test_decode_rejects_plain_text() {
        let err = decode_index_version("Service Unavailable").unwrap_err();
        assert!(matches!(err, ReplicationError::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_mismatched_tags() {
        let err = decode_file_list("<response><arr></lst></response>").unwrap_err();
        assert!(matches!(err, ReplicationError::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_truncated_document() {
        let err = decode_index_version(r#"<response><long name="generation">13</long>"#)
            .unwrap_err();
        assert!(matches!(err, ReplicationError::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_empty_body() {
        let err = decode_file_list("").unwrap_err();
        assert!(matches!(err, ReplicationError::Decode { .. }));
    }
}
