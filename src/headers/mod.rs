//! # Header-table builder
//!
//! Builds the notification type, value genre and value type tables from the
//! OpenZWave C++ sources, so the monitor always names codes exactly as the
//! library that produced them does.
//!
//! ```text
//! <ozw_source_dir>/
//! ├── Notification.h              enum NotificationType
//! └── value_classes/ValueID.h     enum ValueGenre, enum ValueType
//! ```
//!
//! Older source trees keep `ValueID.h` next to `Notification.h`; both layouts
//! are searched. The command class table does not come from the headers, see
//! [`crate::decoder::CommandClassTable::zwave`].

pub mod enum_parser;

use crate::decoder::{CommandClassTable, LookupTable, LookupTables, TableEntry};
use enum_parser::{parse_enum, EnumEntry};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const NOTIFICATION_HEADERS: &[&str] = &["Notification.h"];
const VALUE_ID_HEADERS: &[&str] = &["value_classes/ValueID.h", "ValueID.h"];

const NOTIFICATION_TYPE_ENUM: &str = "NotificationType";
const VALUE_GENRE_ENUM: &str = "ValueGenre";
const VALUE_TYPE_ENUM: &str = "ValueType";

#[derive(Debug, Error)]
pub enum HeaderParseError {
    #[error("source directory {} does not exist", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("none of {candidates:?} found under {}", .dir.display())]
    MissingHeader {
        dir: PathBuf,
        candidates: &'static [&'static str],
    },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("enum {0} not found")]
    MissingEnum(String),

    #[error("enum {0} is not terminated")]
    UnterminatedEnum(String),

    #[error("enum {enum_name}: unexpected token {token:?}")]
    UnexpectedToken { enum_name: String, token: String },

    #[error("enum {enum_name}: cannot evaluate {expr:?} for {entry}")]
    UnsupportedValue {
        enum_name: String,
        entry: String,
        expr: String,
    },
}

/// Tables parsed from the native headers.
#[derive(Debug, Clone, Default)]
pub struct OzwHeaderTables {
    pub notification_types: LookupTable,
    pub value_genres: LookupTable,
    pub value_types: LookupTable,
}

impl OzwHeaderTables {
    /// Combines the parsed tables with a command class table.
    pub fn with_command_classes(self, command_classes: CommandClassTable) -> LookupTables {
        LookupTables {
            notification_types: self.notification_types,
            value_genres: self.value_genres,
            value_types: self.value_types,
            command_classes,
        }
    }
}

/// Parses the three enum tables out of the OpenZWave source tree at `src_dir`.
pub async fn parse_ozw_headers(src_dir: &Path) -> Result<OzwHeaderTables, HeaderParseError> {
    if !path_exists(src_dir).await? || !src_dir.is_dir() {
        return Err(HeaderParseError::MissingSourceDir(src_dir.to_path_buf()));
    }

    let notification_src = read_first_existing(src_dir, NOTIFICATION_HEADERS).await?;
    let value_id_src = read_first_existing(src_dir, VALUE_ID_HEADERS).await?;

    let tables = OzwHeaderTables {
        notification_types: to_table(parse_enum(&notification_src, NOTIFICATION_TYPE_ENUM)?),
        value_genres: to_table(parse_enum(&value_id_src, VALUE_GENRE_ENUM)?),
        value_types: to_table(parse_enum(&value_id_src, VALUE_TYPE_ENUM)?),
    };

    for (enum_name, table) in [
        (NOTIFICATION_TYPE_ENUM, &tables.notification_types),
        (VALUE_GENRE_ENUM, &tables.value_genres),
        (VALUE_TYPE_ENUM, &tables.value_types),
    ] {
        if table.is_empty() {
            warn!("enum {} has no entries, its codes will all show as unknown", enum_name);
        }
    }

    info!(
        "Parsed OpenZWave headers: {} notification types, {} value genres, {} value types",
        tables.notification_types.len(),
        tables.value_genres.len(),
        tables.value_types.len()
    );
    Ok(tables)
}

/// Builds every table the decoder needs: header enums plus the Z-Wave command classes.
pub async fn build_lookup_tables(src_dir: &Path) -> Result<LookupTables, HeaderParseError> {
    let tables = parse_ozw_headers(src_dir).await?;
    Ok(tables.with_command_classes(CommandClassTable::zwave()))
}

/// Later entries never override earlier ones sharing a code, so aliases such as
/// `ValueType_Max = ValueType_Button` keep the original name.
fn to_table(entries: Vec<EnumEntry>) -> LookupTable {
    let mut table = LookupTable::new();
    for entry in entries {
        if table.get(entry.value).is_some() {
            debug!("Skipping alias {} = {}", entry.name, entry.value);
            continue;
        }
        table.insert(entry.value, TableEntry::new(entry.name, entry.description));
    }
    table
}

async fn path_exists(path: &Path) -> Result<bool, HeaderParseError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| HeaderParseError::Io {
            path: path.to_path_buf(),
            source,
        })
}

async fn read_first_existing(
    dir: &Path,
    candidates: &'static [&'static str],
) -> Result<String, HeaderParseError> {
    for candidate in candidates {
        let path = dir.join(candidate);
        if path_exists(&path).await? {
            debug!("Reading {}", path.display());
            let content = tokio::fs::read_to_string(&path).await;
            return content.map_err(|source| HeaderParseError::Io { path, source });
        }
    }
    Err(HeaderParseError::MissingHeader {
        dir: dir.to_path_buf(),
        candidates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const NOTIFICATION_H: &str = r#"
class Notification
{
public:
    enum NotificationType
    {
        Type_ValueAdded = 0,			/**< A new node value has been added to OpenZWave's list. */
        Type_ValueRemoved,				/**< A node value has been removed from OpenZWave's list. */
        Type_ValueChanged,				/**< A node value has been updated from the Z-Wave network. */
        Type_Group						/**< The associations for the node have changed. */
    };
};
"#;

    const VALUE_ID_H: &str = r#"
enum ValueGenre
{
    ValueGenre_Basic = 0,	/**< The 'level' as controlled by basic commands. */
    ValueGenre_User			/**< Basic values an ordinary user would be interested in. */
};
enum ValueType
{
    ValueType_Bool = 0,		/**< Boolean, true or false */
    ValueType_Byte,			/**< 8-bit unsigned value */
    ValueType_Max = ValueType_Byte
};
"#;

    fn source_tree(value_id_path: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Notification.h"), NOTIFICATION_H).unwrap();
        let value_id = dir.path().join(value_id_path);
        fs::create_dir_all(value_id.parent().unwrap()).unwrap();
        fs::write(value_id, VALUE_ID_H).unwrap();
        dir
    }

    #[tokio::test]
    async fn parses_nested_source_layout() {
        let dir = source_tree("value_classes/ValueID.h");
        let tables = parse_ozw_headers(dir.path()).await.unwrap();

        assert_eq!(tables.notification_types.len(), 4);
        assert_eq!(
            tables.notification_types.get(2).unwrap().name,
            "Type_ValueChanged"
        );
        assert_eq!(
            tables.value_genres.get(1).unwrap().description,
            "Basic values an ordinary user would be interested in."
        );
    }

    #[tokio::test]
    async fn parses_flat_source_layout() {
        let dir = source_tree("ValueID.h");
        let tables = parse_ozw_headers(dir.path()).await.unwrap();
        assert_eq!(tables.value_types.len(), 2);
    }

    #[tokio::test]
    async fn alias_keeps_first_name() {
        let dir = source_tree("ValueID.h");
        let tables = parse_ozw_headers(dir.path()).await.unwrap();
        assert_eq!(tables.value_types.get(1).unwrap().name, "ValueType_Byte");
    }

    #[tokio::test]
    async fn missing_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("open-zwave-read-only");
        assert!(matches!(
            parse_ozw_headers(&missing).await,
            Err(HeaderParseError::MissingSourceDir(_))
        ));
    }

    #[tokio::test]
    async fn missing_header_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Notification.h"), NOTIFICATION_H).unwrap();
        assert!(matches!(
            parse_ozw_headers(dir.path()).await,
            Err(HeaderParseError::MissingHeader { .. })
        ));
    }

    #[tokio::test]
    async fn empty_enum_gives_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Notification.h"), NOTIFICATION_H).unwrap();
        fs::write(
            dir.path().join("ValueID.h"),
            "enum ValueGenre\n{\n};\nenum ValueType\n{\n    ValueType_Bool = 0\n};\n",
        )
        .unwrap();

        let tables = parse_ozw_headers(dir.path()).await.unwrap();
        assert!(tables.value_genres.is_empty());
        assert_eq!(tables.value_types.len(), 1);
    }

    #[tokio::test]
    async fn build_adds_command_classes() {
        let dir = source_tree("value_classes/ValueID.h");
        let tables = build_lookup_tables(dir.path()).await.unwrap();
        assert!(!tables.command_classes.is_empty());
        assert!(tables.command_classes.resolve(0x20).known().is_some());
    }
}
