//! Classification of `load()` import references.

use crate::error::{EngineError, EngineResult};
use url::Url;

/// Scheme for remote repository imports.
const REMOTE_SCHEME: &str = "go-get";

/// A parsed `load()` argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportRef {
    /// A path resolved relative to the calling manifest's directory.
    Local(String),
    /// A repository import path resolved through the module loader.
    Remote {
        /// `host/path` of the `go-get://` reference.
        import_path: String,
    },
}

impl ImportRef {
    /// Parse and classify an import reference.
    ///
    /// `go-get://host/path` must round-trip exactly: reconstructing the
    /// reference from host and path has to reproduce the input, which
    /// rejects query and fragment suffixes since those have no defined
    /// meaning. Strings without a scheme are local paths; any other scheme
    /// is an error.
    pub fn parse(reference: &str) -> EngineResult<Self> {
        match Url::parse(reference) {
            Ok(url) if url.scheme() == REMOTE_SCHEME => {
                let import_path = format!("{}{}", url.host_str().unwrap_or(""), url.path());
                if format!("{REMOTE_SCHEME}://{import_path}") != reference {
                    return Err(EngineError::MalformedRemoteReference {
                        reference: reference.to_string(),
                    });
                }
                Ok(Self::Remote { import_path })
            }
            Ok(url) => Err(EngineError::UnsupportedScheme {
                scheme: url.scheme().to_string(),
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Self::Local(reference.to_string()))
            }
            Err(source) => Err(EngineError::ParseImport {
                reference: reference.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_are_local() {
        for reference in ["./sub", "sub", "sub/dir", "../up", "/abs/path"] {
            assert_eq!(
                ImportRef::parse(reference).unwrap(),
                ImportRef::Local(reference.to_string()),
                "{reference:?}"
            );
        }
    }

    #[test]
    fn test_go_get_roundtrip() {
        let parsed = ImportRef::parse("go-get://github.com/windmilleng/blorg-frontend").unwrap();
        assert_eq!(
            parsed,
            ImportRef::Remote {
                import_path: "github.com/windmilleng/blorg-frontend".to_string()
            }
        );
    }

    #[test]
    fn test_go_get_rejects_query_and_fragment() {
        for reference in [
            "go-get://github.com/org/repo?rev=abc",
            "go-get://github.com/org/repo#readme",
            "go-get://github.com/org/repo?a=1#b",
        ] {
            assert!(
                matches!(
                    ImportRef::parse(reference),
                    Err(EngineError::MalformedRemoteReference { .. })
                ),
                "{reference:?}"
            );
        }
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        let err = ImportRef::parse("https://example.com/x").unwrap_err();
        match err {
            EngineError::UnsupportedScheme { scheme } => assert_eq!(scheme, "https"),
            other => panic!("expected UnsupportedScheme, got {other}"),
        }
    }
}
