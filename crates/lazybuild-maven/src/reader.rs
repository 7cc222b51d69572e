//! Reads the dependency list back out of a pom.xml.
//!
//! Uses the quick-xml SAX reader. Only direct `<project><dependencies>`
//! entries with a published scope are returned; `dependencyManagement` and
//! plugin sections are skipped.

use crate::error::{MavenError, Result};
use crate::pom::PomDependency;
use crate::scope::MavenScope;
use quick_xml::Reader;
use quick_xml::events::Event;

#[derive(Default)]
struct DepAccum {
    group_id: Option<String>,
    artifact_id: Option<String>,
    version: Option<String>,
    scope: Option<String>,
}

/// Parses the published dependencies of a POM.
///
/// # Errors
///
/// Returns `MavenError::InvalidPom` if the XML is malformed.
pub fn read_dependencies(content: &str) -> Result<Vec<PomDependency>> {
    let mut dependencies = Vec::new();

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    // element names from <project> down
    let mut stack: Vec<String> = Vec::new();
    let mut current: Option<DepAccum> = None;

    loop {
        let event = reader.read_event().map_err(|e| MavenError::InvalidPom {
            message: e.to_string(),
        })?;

        match event {
            Event::Start(ref e) => {
                let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                if tag == "dependency" && is_dependency_list(&stack) {
                    current = Some(DepAccum::default());
                }
                stack.push(tag);
            }
            Event::Text(ref e) => {
                let Some(dep) = current.as_mut() else {
                    continue;
                };
                let text = match e.decode() {
                    Ok(cow) => cow.trim().to_string(),
                    Err(_) => String::from_utf8_lossy(e.as_ref()).trim().to_string(),
                };
                let text = quick_xml::escape::unescape(&text)
                    .map(|c| c.into_owned())
                    .unwrap_or(text);
                match stack.last().map(String::as_str) {
                    Some("groupId") => dep.group_id = Some(text),
                    Some("artifactId") => dep.artifact_id = Some(text),
                    Some("version") => dep.version = Some(text),
                    Some("scope") => dep.scope = Some(text),
                    _ => {}
                }
            }
            Event::End(_) => {
                let tag = stack.pop();
                if tag.as_deref() == Some("dependency")
                    && is_dependency_list(&stack)
                    && let Some(dep) = current.take()
                    && let Some(dep) = finalize(dep)
                {
                    dependencies.push(dep);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(dependencies)
}

fn is_dependency_list(stack: &[String]) -> bool {
    matches!(stack, [project, deps] if project == "project" && deps == "dependencies")
}

fn finalize(dep: DepAccum) -> Option<PomDependency> {
    let Some(scope) = MavenScope::parse(dep.scope.as_deref()) else {
        tracing::debug!("Skipping dependency with unpublished scope {:?}", dep.scope);
        return None;
    };
    Some(PomDependency {
        group_id: dep.group_id?,
        artifact_id: dep.artifact_id?,
        version: dep.version,
        scope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_dependencies() {
        let pom = r"<project>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>org.junit</groupId>
        <artifactId>junit-bom</artifactId>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <dependency>
      <groupId>net.dv8tion</groupId>
      <artifactId>JDA</artifactId>
      <version>5.6.1</version>
    </dependency>
    <dependency>
      <groupId>org.postgresql</groupId>
      <artifactId>postgresql</artifactId>
      <version>42.7.7</version>
      <scope>runtime</scope>
    </dependency>
    <dependency>
      <groupId>org.junit.jupiter</groupId>
      <artifactId>junit-jupiter</artifactId>
      <scope>test</scope>
    </dependency>
  </dependencies>
</project>";

        let deps = read_dependencies(pom).unwrap();
        assert_eq!(
            deps,
            vec![
                PomDependency {
                    group_id: "net.dv8tion".into(),
                    artifact_id: "JDA".into(),
                    version: Some("5.6.1".into()),
                    scope: MavenScope::Compile,
                },
                PomDependency {
                    group_id: "org.postgresql".into(),
                    artifact_id: "postgresql".into(),
                    version: Some("42.7.7".into()),
                    scope: MavenScope::Runtime,
                },
            ]
        );
    }

    #[test]
    fn test_read_malformed() {
        let result = read_dependencies("<project><dependencies></project>");
        assert!(matches!(result, Err(MavenError::InvalidPom { .. })));
    }

    #[test]
    fn test_read_empty_project() {
        assert!(read_dependencies("<project/>").unwrap().is_empty());
    }
}
