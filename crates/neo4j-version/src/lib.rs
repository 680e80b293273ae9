//! Neo4j server version handling.
//!
//! Index statements and the shape of the `db.indexes` catalog changed across
//! Neo4j releases. This crate parses the kernel version reported by
//! `dbms.components()` and picks the matching behaviour from small
//! `(minimum version, behaviour)` tables, so callers never compare versions
//! inline.

use semver::Version;

/// How indexes are created on a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexCreation {
    /// `CREATE INDEX IF NOT EXISTS FOR (t:Label) ON (t.property)`; idempotent.
    IfNotExists,
    /// `CREATE INDEX ON :Label(property)`; fails if the index already exists,
    /// so the catalog must be checked first.
    Legacy,
}

impl std::fmt::Display for IndexCreation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IfNotExists => write!(f, "if-not-exists"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Column of the `CALL db.indexes` result that lists an index's labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLabelField {
    /// Neo4j 4.0 and later.
    LabelsOrTypes,
    /// Neo4j 3.x.
    TokenNames,
}

impl CatalogLabelField {
    pub fn column(&self) -> &'static str {
        match self {
            Self::LabelsOrTypes => "labelsOrTypes",
            Self::TokenNames => "tokenNames",
        }
    }
}

impl std::fmt::Display for CatalogLabelField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Index creation dialects, newest first.
const INDEX_CREATION_TABLE: &[((u64, u64, u64), IndexCreation)] = &[
    ((4, 1, 3), IndexCreation::IfNotExists),
    ((0, 0, 0), IndexCreation::Legacy),
];

/// Catalog label columns, newest first.
const CATALOG_LABEL_FIELD_TABLE: &[((u64, u64, u64), CatalogLabelField)] = &[
    ((4, 0, 0), CatalogLabelField::LabelsOrTypes),
    ((0, 0, 0), CatalogLabelField::TokenNames),
];

fn select<T: Copy>(table: &[((u64, u64, u64), T)], version: &Version) -> Option<T> {
    let key = (version.major, version.minor, version.patch);
    table
        .iter()
        .find(|(min, _)| key >= *min)
        .map(|(_, behaviour)| *behaviour)
}

/// Version and edition reported by a Neo4j server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Version string exactly as reported.
    pub raw_version: String,
    /// Parsed version; `None` if the string was not recognised.
    pub version: Option<Version>,
    pub edition: String,
}

impl ServerInfo {
    /// Build from the raw strings returned by `dbms.components()`.
    pub fn new(raw_version: impl Into<String>, edition: impl Into<String>) -> Self {
        let raw_version = raw_version.into();
        let version = match parse_version_string(&raw_version) {
            Ok(version) => Some(version),
            Err(e) => {
                tracing::warn!("{e}");
                None
            }
        };
        Self {
            raw_version,
            version,
            edition: edition.into(),
        }
    }

    /// Index creation dialect for this server.
    ///
    /// Servers with an unrecognised version string get the newest dialect.
    pub fn index_creation(&self) -> IndexCreation {
        match &self.version {
            Some(version) => {
                select(INDEX_CREATION_TABLE, version).unwrap_or(IndexCreation::Legacy)
            }
            None => {
                tracing::warn!(
                    "Unknown Neo4j version '{}', assuming {} index creation",
                    self.raw_version,
                    INDEX_CREATION_TABLE[0].1
                );
                INDEX_CREATION_TABLE[0].1
            }
        }
    }

    /// Label column of the index catalog for this server.
    pub fn catalog_label_field(&self) -> CatalogLabelField {
        match &self.version {
            Some(version) => select(CATALOG_LABEL_FIELD_TABLE, version)
                .unwrap_or(CatalogLabelField::TokenNames),
            None => CATALOG_LABEL_FIELD_TABLE[0].1,
        }
    }
}

impl std::fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.raw_version, self.edition)
    }
}

/// Parse a Neo4j kernel version such as "4.1.3", "5.26.0", "4.0" or
/// "3.5.35-enterprise".
///
/// Missing minor/patch components default to zero; anything after the
/// numeric components is ignored unless it forms a valid semver pre-release.
pub fn parse_version_string(version_string: &str) -> anyhow::Result<Version> {
    let version_string = version_string.trim();

    tracing::debug!("Parsing Neo4j version string: '{version_string}'");

    if let Ok(version) = Version::parse(version_string) {
        return Ok(version);
    }

    let numeric: String = version_string
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = numeric
        .split('.')
        .filter(|part| !part.is_empty())
        .map(str::parse::<u64>);

    let major = match parts.next() {
        Some(Ok(major)) => major,
        _ => {
            return Err(anyhow::anyhow!(
                "Invalid Neo4j version format: '{version_string}'. Expected format: 'X.Y.Z'"
            ))
        }
    };
    let minor = parts.next().and_then(Result::ok).unwrap_or(0);
    let patch = parts.next().and_then(Result::ok).unwrap_or(0);

    Ok(Version::new(major, minor, patch))
}
