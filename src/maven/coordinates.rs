use std::fmt;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::CoordinateParseError;

lazy_static! {
    // <groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>, no path separators
    static ref COORDINATES_REGEX: Regex =
        Regex::new(r"^([^: /\\]+):([^: /\\]+)(:([^: /\\]*)(:([^: /\\]+))?)?:([^: /\\]+)$").unwrap();
}

pub const DEFAULT_EXTENSION: &str = "jar";

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenVersion(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenArtifactId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenGroupId(pub String);

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenCoordinates {
    pub group_id: MavenGroupId,
    pub artifact_id: MavenArtifactId,
    pub version: MavenVersion,
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum MavenClassifier {
    Unclassified,
    Classified(String),
}

/// A single downloadable file in a Maven repository: coordinates plus classifier and extension.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MavenArtifactRef {
    pub coordinates: MavenCoordinates,
    pub classifier: MavenClassifier,
    pub file_extension: String, // without leading '.', e.g. "jar"
}

impl MavenArtifactRef {
    /// Parses `<groupId>:<artifactId>[:<extension>[:<classifier>]]:<version>`. An empty extension
    ///  segment falls back to "jar".
    pub fn parse(coordinates: &str) -> Result<MavenArtifactRef, CoordinateParseError> {
        let captures = COORDINATES_REGEX.captures(coordinates)
            .ok_or_else(|| CoordinateParseError(coordinates.to_string()))?;

        let group = |idx: usize| captures.get(idx).map(|m| m.as_str());

        let (Some(group_id), Some(artifact_id), Some(version)) = (group(1), group(2), group(7)) else {
            return Err(CoordinateParseError(coordinates.to_string()));
        };

        // segments become path components in a repository
        let segments = [Some(group_id), Some(artifact_id), Some(version), group(4), group(6)];
        if segments.iter().flatten().any(|s| *s == "." || *s == "..") {
            return Err(CoordinateParseError(coordinates.to_string()));
        }

        let file_extension = match group(4) {
            Some(ext) if !ext.is_empty() => ext,
            _ => DEFAULT_EXTENSION,
        };
        let classifier = match group(6) {
            Some(c) => MavenClassifier::Classified(c.to_string()),
            None => MavenClassifier::Unclassified,
        };

        Ok(MavenArtifactRef {
            coordinates: MavenCoordinates {
                group_id: MavenGroupId(group_id.to_string()),
                artifact_id: MavenArtifactId(artifact_id.to_string()),
                version: MavenVersion(version.to_string()),
            },
            classifier,
            file_extension: file_extension.to_string(),
        })
    }
}

impl FromStr for MavenArtifactRef {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MavenArtifactRef::parse(s)
    }
}

impl fmt::Display for MavenArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}",
               self.coordinates.group_id.0,
               self.coordinates.artifact_id.0,
               self.file_extension,
        )?;
        if let MavenClassifier::Classified(c) = &self.classifier {
            write!(f, ":{}", c)?;
        }
        write!(f, ":{}", self.coordinates.version.0)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    fn artifact(group_id: &str, artifact_id: &str, ext: &str, classifier: Option<&str>, version: &str) -> MavenArtifactRef {
        MavenArtifactRef {
            coordinates: MavenCoordinates {
                group_id: MavenGroupId(group_id.to_string()),
                artifact_id: MavenArtifactId(artifact_id.to_string()),
                version: MavenVersion(version.to_string()),
            },
            classifier: match classifier {
                None => MavenClassifier::Unclassified,
                Some(c) => MavenClassifier::Classified(c.to_string()),
            },
            file_extension: ext.to_string(),
        }
    }

    #[rstest]
    #[case::simple("org.jetbrains.kotlin:kotlin-stdlib:1.1.1", Some(artifact("org.jetbrains.kotlin", "kotlin-stdlib", "jar", None, "1.1.1")))]
    #[case::extension("com.example:lib:pom:2.0", Some(artifact("com.example", "lib", "pom", None, "2.0")))]
    #[case::empty_extension("com.example:lib::2.0", Some(artifact("com.example", "lib", "jar", None, "2.0")))]
    #[case::classifier("org.lwjgl:lwjgl:jar:natives-linux:3.3.3", Some(artifact("org.lwjgl", "lwjgl", "jar", Some("natives-linux"), "3.3.3")))]
    #[case::snapshot("a:b:1.0-SNAPSHOT", Some(artifact("a", "b", "jar", None, "1.0-SNAPSHOT")))]
    #[case::too_few_segments("org.example:lib", None)]
    #[case::too_many_segments("a:b:c:d:e:f", None)]
    #[case::empty_group(":lib:1.0", None)]
    #[case::empty_version("a:b:", None)]
    #[case::whitespace("a:b c:1.0", None)]
    #[case::empty("", None)]
    #[case::parent_artifact("g:..:1.0", None)]
    #[case::parent_version("g:a:..", None)]
    #[case::current_group(".:a:1.0", None)]
    #[case::parent_classifier("g:a:jar:..:1.0", None)]
    #[case::slash_in_artifact("g:../../x:1.0", None)]
    #[case::slash_in_version("g:a:1.0/../..", None)]
    #[case::backslash("g:a:..\\..\\x:1.0", None)]
    #[case::dots_inside_segment("g:a..b:1.0", Some(artifact("g", "a..b", "jar", None, "1.0")))]
    fn test_parse(#[case] coordinates: &str, #[case] expected: Option<MavenArtifactRef>) {
        let actual = MavenArtifactRef::parse(coordinates);

        if let Some(expected) = expected {
            assert_eq!(actual.unwrap(), expected);
        }
        else {
            assert!(actual.is_err());
        }
    }

    #[rstest]
    #[case("a:b:1.0", "a:b:jar:1.0")]
    #[case("a:b:zip:dist:1.0", "a:b:zip:dist:1.0")]
    fn test_display_parses_back(#[case] coordinates: &str, #[case] expected_display: &str) {
        let a = MavenArtifactRef::parse(coordinates).unwrap();
        assert_eq!(a.to_string(), expected_display);
        assert_eq!(MavenArtifactRef::parse(&a.to_string()).unwrap(), a);
    }
}
