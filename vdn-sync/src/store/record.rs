use rusqlite::types::FromSql;
use rusqlite::types::FromSqlError;
use rusqlite::types::FromSqlResult;
use rusqlite::types::ToSqlOutput;
use rusqlite::types::ValueRef;
use rusqlite::ToSql;

/// Discriminant and key of a resolver record kept in the generic table.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Text { key: String },
    Contenthash,
    Dns { key: String },
    Zonehash,
}

impl RecordKind {
    /// DNS records are keyed by their wire-format owner name and resource type.
    pub fn dns(
        name: &[u8],
        resource: u16,
    ) -> Self {
        RecordKind::Dns {
            key: format!("{} {}", String::from_utf8_lossy(name), resource),
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            RecordKind::Text { .. } => "text",
            RecordKind::Contenthash => "contenthash",
            RecordKind::Dns { .. } => "dns",
            RecordKind::Zonehash => "zonehash",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            RecordKind::Text { key } | RecordKind::Dns { key } => key,
            RecordKind::Contenthash | RecordKind::Zonehash => "",
        }
    }
}

/// Stored value of a resolver record: text records keep their string,
/// everything else is kept as raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordValue {
    Text(String),
    Bytes(Vec<u8>),
}

impl ToSql for RecordValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            RecordValue::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
            RecordValue::Bytes(bytes) => ToSqlOutput::Borrowed(ValueRef::Blob(bytes)),
        })
    }
}

impl FromSql for RecordValue {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(text) => {
                std::str::from_utf8(text)
                    .map(|text| RecordValue::Text(text.to_owned()))
                    .map_err(|err| FromSqlError::Other(Box::new(err)))
            },
            ValueRef::Blob(bytes) => Ok(RecordValue::Bytes(bytes.to_vec())),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}
