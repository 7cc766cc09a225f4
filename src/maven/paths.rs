use std::path::PathBuf;

use crate::maven::coordinates::*;

/// The artifact's path relative to a repository root in the standard Maven layout, using '/' as
///  the separator, e.g. "org/jetbrains/kotlin/kotlin-stdlib/1.1.1/kotlin-stdlib-1.1.1.jar"
pub fn as_maven_path(artifact_ref: &MavenArtifactRef) -> String {
    format!(
        "{}/{}/{}/{}",
        artifact_ref.coordinates.group_id.0.replace('.', "/"),
        artifact_ref.coordinates.artifact_id.0,
        artifact_ref.coordinates.version.0,
        maven_file_name(artifact_ref),
    )
}

/// Same as [as_maven_path], but as a relative file system path
pub fn as_relative_path(artifact_ref: &MavenArtifactRef) -> PathBuf {
    let mut result: PathBuf = artifact_ref.coordinates.group_id.0.split('.').collect();
    result.push(&artifact_ref.coordinates.artifact_id.0);
    result.push(&artifact_ref.coordinates.version.0);
    result.push(maven_file_name(artifact_ref));
    result
}

/// `<artifactId>-<version>[-<classifier>].<extension>`
pub fn maven_file_name(artifact_ref: &MavenArtifactRef) -> String {
    let classifier_string = match &artifact_ref.classifier {
        MavenClassifier::Unclassified => "".to_string(),
        MavenClassifier::Classified(c) => format!("-{}", c),
    };

    format!("{}-{}{}.{}",
            artifact_ref.coordinates.artifact_id.0,
            artifact_ref.coordinates.version.0,
            classifier_string,
            artifact_ref.file_extension,
    )
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::release("org.jetbrains.kotlin:kotlin-stdlib:1.1.1", "org/jetbrains/kotlin/kotlin-stdlib/1.1.1/kotlin-stdlib-1.1.1.jar")]
    #[case::extension("com.example:lib:pom:2.0", "com/example/lib/2.0/lib-2.0.pom")]
    #[case::classifier("org.lwjgl:lwjgl:jar:natives-linux:3.3.3", "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-linux.jar")]
    #[case::classifier_with_dash("a:b:jar:x-y:1.0", "a/b/1.0/b-1.0-x-y.jar")]
    #[case::snapshot("a.b:c:1.0-SNAPSHOT", "a/b/c/1.0-SNAPSHOT/c-1.0-SNAPSHOT.jar")]
    fn test_as_maven_path(#[case] coordinates: &str, #[case] expected: &str) {
        let artifact_ref = MavenArtifactRef::parse(coordinates).unwrap();
        assert_eq!(as_maven_path(&artifact_ref), expected);
        assert_eq!(as_relative_path(&artifact_ref), expected.split('/').collect::<PathBuf>());
    }
}
